const NUMERALS: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Largest value with a standard Roman form.
pub const MAX_ROMAN: u32 = 3999;

/// Greedy subtractive Roman numeral. Only defined for `1..=MAX_ROMAN`;
/// callers range-check first.
pub fn to_roman(n: u32) -> String {
    debug_assert!((1..=MAX_ROMAN).contains(&n), "roman numeral out of range: {}", n);
    let mut rest = n;
    let mut out = String::new();
    for &(value, symbol) in NUMERALS.iter() {
        while rest >= value {
            out.push_str(symbol);
            rest -= value;
        }
    }
    out
}
