// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Decimal rounding of binary floats.
//!
//! Billing and progress figures are rounded to a fixed number of decimals.
//! `round_to` decides on the exact value a float holds rather than on an
//! intermediate product such as `value * 100.0`, whose own rounding error can
//! push a value that lies just below a tie onto it. The result is the float
//! nearest to the rounded decimal; exact ties go to the even last digit.

/// Powers of ten up to the largest supported number of decimals.
const POWERS_OF_TEN: [u128; 10] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

/// The largest number of decimals `round_to` accepts.
pub const MAX_DECIMALS: u32 = POWERS_OF_TEN.len() as u32 - 1;

/// Rounds `value` to `decimals` decimal places.
///
/// Non-finite values are returned unchanged.
///
/// # Panics
///
/// Panics if `decimals > MAX_DECIMALS`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    assert!(
        decimals <= MAX_DECIMALS,
        "called `round_to` with {} decimals: at most {} are supported",
        decimals,
        MAX_DECIMALS
    );

    if !value.is_finite() || value == 0.0 {
        return value;
    }

    let bits = value.abs().to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    // |value| = mantissa * 2^-shift
    let (mantissa, shift) = if exponent == 0 {
        (fraction, 1074)
    } else {
        (fraction | (1u64 << 52), 1075 - exponent)
    };
    if shift <= 0 {
        return value;
    }

    let power = POWERS_OF_TEN[decimals as usize];
    // mantissa * power < 2^53 * 2^30, so anything shifted by 84 or more is below a half.
    let scaled = mantissa as u128 * power;
    let units = if shift >= 84 {
        0
    } else {
        let floor = scaled >> shift;
        let remainder = scaled & ((1u128 << shift) - 1);
        let half = 1u128 << (shift - 1);
        if remainder > half || (remainder == half && floor & 1 == 1) {
            floor + 1
        } else {
            floor
        }
    };

    if units > 1u128 << 53 {
        // Doubles are spaced wider than 10^-decimals here, so `value` is the nearest one.
        return value;
    }
    (units as f64 / power as f64).copysign(value)
}
