//! Home of `BitMap`.
//!
//! The teacher sizes this with `typenum`/`generic-array` so the bit count is a
//! type-level quantity. This crate only ever needs a bitmap for the share-lock
//! table (§4.12), whose capacity is a plain crate constant, so the type-level
//! machinery is replaced with two const generics: `BITS` (logical length) and
//! `BYTES` (`(BITS + 7) / 8`, computed by the caller at the use site).

use super::Bits;

// A bad version of BitVec, I guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMap<const BITS: usize, const BYTES: usize> {
    arr: [u8; BYTES],

    // Helper variables to speed up some queries:
    num_free_bits: usize,
    next_free: usize,
}

impl<const BITS: usize, const BYTES: usize> Default for BitMap<BITS, BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BITS: usize, const BYTES: usize> BitMap<BITS, BYTES> {
    pub fn new() -> Self {
        Self {
            arr: [0; BYTES],

            num_free_bits: BITS,
            next_free: 0,
        }
    }

    pub fn length(&self) -> usize {
        BITS
    }

    pub fn empty_bits(&self) -> usize {
        self.num_free_bits
    }

    pub fn clear_all(&mut self) {
        // Optimizer, save us.
        for b in 0..self.length() {
            let _ = self.set(b, false).unwrap();
        }
    }

    // Returns `Ok` if in bounds and `Err` otherwise.
    fn in_bounds(&self, bit: usize) -> Result<(), ()> {
        if (0..self.length()).contains(&bit) {
            Ok(())
        } else {
            Err(())
        }
    }

    // Returns `Ok(idx, offset)` if in bounds and `Err` if not in bounds.
    fn bit_to_idx(&self, bit: usize) -> Result<(usize, usize), ()> {
        self.in_bounds(bit).map(|()| (bit / 8, bit % 8))
    }

    // Returns `Ok(bool)` if in bounds and `Err` otherwise.
    pub fn get(&self, bit: usize) -> Result<bool, ()> {
        self.bit_to_idx(bit).map(|(idx, offset)| self.arr[idx].b(offset as u32))
    }

    // Returns the previous value of the bit.
    //
    // Returns an `Err` if out of bounds.
    pub fn set(&mut self, bit: usize, val: bool) -> Result<bool, ()> {
        self.bit_to_idx(bit).map(|(idx, offset)| {
            let prev: bool = self.arr[idx].b(offset as u32);
            self.arr[idx].set_bit(offset as u32, val);

            match (prev, val) {
                (false, true) => self.num_free_bits -= 1,
                (true, false) => {
                    self.num_free_bits += 1;
                    self.next_free = bit;
                }

                (true, true) | (false, false) => {}
            }

            prev
        })
    }

    // Returns `Err` if there are no empty bits available.
    pub fn next_empty_bit(&mut self) -> Result<usize, ()> {
        // The only way this get can fail is if the length is 0. If this happens
        // we should return Err since we really do not have any empty bits (or
        // _any_ bits) available. So, the `?` is appropriate here.
        if self.get(self.next_free)? == false {
            return Ok(self.next_free);
        } else {
            // If that didn't work we need to do a sweep.
            if self.num_free_bits == 0 {
                return Err(());
            }

            for b in (self.next_free..self.length()).chain(0..self.next_free) {
                if self.get(b).unwrap() == false {
                    self.next_free = b;
                    return Ok(b);
                }
            }

            Err(())
        }
    }
}

#[cfg(test)]
mod bitmap {
    use super::*;
    use assert_eq as eq;

    #[test]
    fn basic() {
        let mut b = BitMap::<31, 4>::new();

        eq!(b.length(), 31);
        eq!(b.empty_bits(), 31);

        // Get:
        for idx in 0..31 {
            eq!(b.get(idx), Ok(false));
        }

        // Get out of range:
        eq!(b.get(32), Err(()));

        // Set all using get next free:
        for _ in 0..31 {
            let idx = b.next_empty_bit();
            assert!(idx.is_ok());

            b.set(idx.unwrap(), true).unwrap();
        }

        // There should be no empty bits now:
        eq!(b.empty_bits(), 0);
        eq!(b.next_empty_bit(), Err(()));

        // Finally, clear them all:
        b.clear_all();
        eq!(b.empty_bits(), 31);
        eq!(b.length(), 31);
    }
}
