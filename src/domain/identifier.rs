//! Brazilian taxpayer identifiers: CPF (individuals, 11 digits) and CNPJ
//! (companies, 14 digits), both protected by two mod-11 check digits.

use std::fmt;

const CPF_LENGTH: usize = 11;
const CNPJ_LENGTH: usize = 14;

/// Passes the check-digit test but is reserved and never issued.
const CPF_BLOCKLIST: &[&str] = &["12345678909"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    Individual,
    Company,
}

/// A taxpayer identifier whose check digits have been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxId {
    kind: TaxIdKind,
    digits: String,
}

impl TaxId {
    /// Strips punctuation and validates the remaining digits as a CPF or a CNPJ.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = strip_non_digits(raw);
        let kind = if is_valid_cpf(&digits) {
            TaxIdKind::Individual
        } else if is_valid_cnpj(&digits) {
            TaxIdKind::Company
        } else {
            return None;
        };
        Some(Self { kind, digits })
    }

    pub fn kind(&self) -> TaxIdKind {
        self.kind
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.digits;
        match self.kind {
            TaxIdKind::Individual => {
                write!(f, "{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
            }
            TaxIdKind::Company => write!(
                f,
                "{}.{}.{}/{}-{}",
                &d[0..2],
                &d[2..5],
                &d[5..8],
                &d[8..12],
                &d[12..14]
            ),
        }
    }
}

/// True when `raw` is a valid CPF or CNPJ once punctuation is removed.
pub fn is_valid(raw: &str) -> bool {
    TaxId::parse(raw).is_some()
}

pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn to_digits(digits: &str) -> Vec<u32> {
    digits.bytes().map(|b| u32::from(b - b'0')).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

fn check_digit(weighted_sum: u32) -> u32 {
    let remainder = weighted_sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

fn is_valid_cpf(digits: &str) -> bool {
    if digits.len() != CPF_LENGTH || CPF_BLOCKLIST.contains(&digits) {
        return false;
    }
    let d = to_digits(digits);
    if all_same(&d) {
        return false;
    }

    // Weights run from len+1 down to 2.
    let cpf_digit = |prefix: &[u32]| {
        let top = prefix.len() as u32 + 1;
        let sum: u32 = prefix
            .iter()
            .enumerate()
            .map(|(i, digit)| digit * (top - i as u32))
            .sum();
        check_digit(sum)
    };

    let first = cpf_digit(&d[..9]);
    let second = cpf_digit(&d[..10]);
    first == d[9] && second == d[10]
}

fn is_valid_cnpj(digits: &str) -> bool {
    if digits.len() != CNPJ_LENGTH {
        return false;
    }
    let d = to_digits(digits);
    if all_same(&d) {
        return false;
    }

    // Weights cycle 2..=9 starting from the rightmost digit of the prefix.
    let cnpj_digit = |prefix: &[u32]| {
        let sum: u32 = prefix
            .iter()
            .rev()
            .enumerate()
            .map(|(i, digit)| digit * (2 + (i as u32 % 8)))
            .sum();
        check_digit(sum)
    };

    let first = cnpj_digit(&d[..12]);
    let second = cnpj_digit(&d[..13]);
    first == d[12] && second == d[13]
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CPF: &str = "529.982.247-25";
    const VALID_CNPJ: &str = "11.444.777/0001-61";

    fn flip(digits: &str, index: usize) -> String {
        digits
            .char_indices()
            .map(|(i, c)| {
                if i == index {
                    let d = c.to_digit(10).unwrap();
                    char::from_digit((d + 1) % 10, 10).unwrap()
                } else {
                    c
                }
            })
            .collect()
    }

    #[test]
    fn test_known_identifiers_are_valid() {
        assert!(is_valid(VALID_CPF));
        assert!(is_valid("52998224725"));
        assert!(is_valid(VALID_CNPJ));
        assert!(is_valid("11444777000161"));
    }

    #[test]
    fn test_parse_reports_kind_and_mask() {
        let cpf = TaxId::parse("52998224725").unwrap();
        assert_eq!(cpf.kind(), TaxIdKind::Individual);
        assert_eq!(cpf.to_string(), VALID_CPF);

        let cnpj = TaxId::parse(" 11444777000161 ").unwrap();
        assert_eq!(cnpj.kind(), TaxIdKind::Company);
        assert_eq!(cnpj.to_string(), VALID_CNPJ);
    }

    #[test]
    fn test_wrong_lengths_are_invalid() {
        for raw in ["", "abc", "5299822472", "529982247250", "1144477700016", "114447770001610"] {
            assert!(!is_valid(raw), "{raw:?} should be invalid");
        }
    }

    #[test]
    fn test_single_digit_flip_breaks_cpf() {
        let digits = strip_non_digits(VALID_CPF);
        for i in 0..digits.len() {
            assert!(!is_valid(&flip(&digits, i)), "flip at {i} still valid");
        }
    }

    #[test]
    fn test_single_digit_flip_breaks_cnpj() {
        let digits = strip_non_digits(VALID_CNPJ);
        for i in 0..digits.len() {
            assert!(!is_valid(&flip(&digits, i)), "flip at {i} still valid");
        }
    }

    #[test]
    fn test_repeated_digits_are_invalid() {
        for d in 0..=9 {
            let c = char::from_digit(d, 10).unwrap();
            assert!(!is_valid(&c.to_string().repeat(11)));
            assert!(!is_valid(&c.to_string().repeat(14)));
        }
    }

    #[test]
    fn test_blocklisted_cpf_is_invalid() {
        assert!(!is_valid("123.456.789-09"));
    }

    #[test]
    fn test_check_digit_remainder_rule() {
        assert_eq!(check_digit(22), 0);
        assert_eq!(check_digit(23), 0);
        assert_eq!(check_digit(295), 2);
    }
}
