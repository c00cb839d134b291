use derive_more::{AsRef, Display, Into};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.chars().count();

        if len > 64 {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}

/// E-mail addresses are compared case-insensitively, so they are stored lowercased.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Email(String);

impl Email {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn new(email: &str) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();

        if email.is_empty() {
            return Err(EmailError::Empty);
        }

        let Some((local, domain)) = email.split_once('@') else {
            return Err(EmailError::Invalid);
        };

        if local.is_empty()
            || domain.contains('@')
            || domain.starts_with('.')
            || domain.ends_with('.')
            || !domain.contains('.')
            || email.contains(char::is_whitespace)
        {
            return Err(EmailError::Invalid);
        }

        Ok(Email(email))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EmailError {
    #[error("E-mail address must not be empty")]
    Empty,
    #[error("Invalid e-mail address")]
    Invalid,
}

#[derive(AsRef, Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn new(password: &str) -> Result<Self, PasswordError> {
        let len = password.chars().count();

        if len < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort(len));
        }

        Ok(Password(password.to_string()))
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PasswordError {
    #[error("Password must be at least 6 characters ({0} < 6)")]
    TooShort(usize),
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sets(u32);

impl Sets {
    pub fn new(value: u32) -> Result<Self, SetsError> {
        if !(1..100).contains(&value) {
            return Err(SetsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Sets {
    type Error = SetsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Sets::new(parsed_value),
            Err(_) => Err(SetsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetsError {
    #[error("Sets must be in the range 1 to 99")]
    OutOfRange,
    #[error("Sets must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(1..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 1 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        if ((value * 10.0).round() - value * 10.0).abs() > 0.001 {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.replace(',', ".").trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 kg")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MachineNumber(u32);

impl MachineNumber {
    pub fn new(value: u32) -> Result<Self, MachineNumberError> {
        if !(1..10_000).contains(&value) {
            return Err(MachineNumberError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for MachineNumber {
    type Error = MachineNumberError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => MachineNumber::new(parsed_value),
            Err(_) => Err(MachineNumberError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MachineNumberError {
    #[error("Machine number must be in the range 1 to 9999")]
    OutOfRange,
    #[error("Machine number must be an integer")]
    ParseError,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Leg Press", Ok(Name("Leg Press".to_string())))]
    #[case("  Lat Pulldown  ", Ok(Name("Lat Pulldown".to_string())))]
    #[case("", Err(NameError::Empty))]
    #[case("   ", Err(NameError::Empty))]
    #[case(
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        Err(NameError::TooLong(65))
    )]
    fn test_name_new(#[case] name: &str, #[case] expected: Result<Name, NameError>) {
        assert_eq!(Name::new(name), expected);
    }

    #[rstest]
    #[case("alice@example.com", Ok(Email("alice@example.com".to_string())))]
    #[case(" Alice@Example.COM ", Ok(Email("alice@example.com".to_string())))]
    #[case("", Err(EmailError::Empty))]
    #[case("alice", Err(EmailError::Invalid))]
    #[case("@example.com", Err(EmailError::Invalid))]
    #[case("alice@example", Err(EmailError::Invalid))]
    #[case("alice@@example.com", Err(EmailError::Invalid))]
    #[case("al ice@example.com", Err(EmailError::Invalid))]
    fn test_email_new(#[case] email: &str, #[case] expected: Result<Email, EmailError>) {
        assert_eq!(Email::new(email), expected);
    }

    #[rstest]
    #[case("secret", true)]
    #[case("12345", false)]
    #[case("", false)]
    fn test_password_new(#[case] password: &str, #[case] valid: bool) {
        assert_eq!(Password::new(password).is_ok(), valid);
    }

    #[test]
    fn test_password_debug_is_redacted() {
        assert_eq!(
            format!("{:?}", Password::new("hunter22").unwrap()),
            "Password(***)"
        );
    }

    #[rstest]
    #[case("3", Ok(Sets(3)))]
    #[case("0", Err(SetsError::OutOfRange))]
    #[case("100", Err(SetsError::OutOfRange))]
    #[case("three", Err(SetsError::ParseError))]
    fn test_sets_try_from(#[case] value: &str, #[case] expected: Result<Sets, SetsError>) {
        assert_eq!(Sets::try_from(value), expected);
    }

    #[rstest]
    #[case("12", Ok(Reps(12)))]
    #[case("0", Err(RepsError::OutOfRange))]
    #[case("1000", Err(RepsError::OutOfRange))]
    #[case("1.5", Err(RepsError::ParseError))]
    fn test_reps_try_from(#[case] value: &str, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::try_from(value), expected);
    }

    #[rstest]
    #[case("0", Ok(Weight(0.0)))]
    #[case("80.8", Ok(Weight(80.8)))]
    #[case("22,5", Ok(Weight(22.5)))]
    #[case("1000", Err(WeightError::OutOfRange))]
    #[case("-1", Err(WeightError::OutOfRange))]
    #[case("10.25", Err(WeightError::InvalidResolution))]
    #[case("heavy", Err(WeightError::ParseError))]
    fn test_weight_try_from(#[case] value: &str, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::try_from(value), expected);
    }

    #[rstest]
    #[case("7", Ok(MachineNumber(7)))]
    #[case("0", Err(MachineNumberError::OutOfRange))]
    #[case("x", Err(MachineNumberError::ParseError))]
    fn test_machine_number_try_from(
        #[case] value: &str,
        #[case] expected: Result<MachineNumber, MachineNumberError>,
    ) {
        assert_eq!(MachineNumber::try_from(value), expected);
    }
}
