//! # Account Forms
//!
//! Registration, addresses and phone verification.

use crate::error::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};

/// Special characters accepted (and one required) in a password
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// A saved delivery address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub complement: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub reference_point: String,
}

impl Address {
    /// One-line form used on the order's `address` field
    pub fn one_line(&self) -> String {
        let mut line = format!("{}, {}", self.street, self.number);
        if !self.complement.trim().is_empty() {
            line.push_str(&format!(" ({})", self.complement.trim()));
        }
        line.push_str(&format!(
            " - {}, {}/{} - CEP {}",
            self.neighborhood, self.city, self.state, self.zip_code
        ));
        line
    }
}

/// Body of `POST /addresses/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    #[serde(default)]
    pub name: String,
    pub zip_code: String,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub reference_point: String,
}

impl NewAddress {
    pub fn validate(&self) -> ShopResult<()> {
        for (field, value) in [
            ("zip_code", &self.zip_code),
            ("street", &self.street),
            ("number", &self.number),
            ("neighborhood", &self.neighborhood),
            ("city", &self.city),
            ("state", &self.state),
        ] {
            if value.trim().is_empty() {
                return Err(ShopError::validation(field, "Campo obrigatório."));
            }
        }
        if self.state.trim().chars().count() != 2 {
            return Err(ShopError::validation("state", "Use a sigla do estado (ex: SP)."));
        }
        let zip_digits = self.zip_code.chars().filter(char::is_ascii_digit).count();
        if zip_digits != 8 {
            return Err(ShopError::validation("zip_code", "CEP deve ter 8 dígitos."));
        }
        Ok(())
    }
}

/// Check the password strength rule.
///
/// At least [`MIN_PASSWORD_LEN`] characters drawn from ASCII letters, digits
/// and [`PASSWORD_SYMBOLS`], including a lowercase letter, an uppercase
/// letter, a digit and a symbol.
pub fn is_strong_password(password: &str) -> bool {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c));

    allowed
        && password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// Sign-up form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body of `POST /register/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Registration {
    pub fn validate(&self) -> ShopResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(ShopError::validation("first_name", "Informe seu nome."));
        }
        if self.last_name.trim().is_empty() {
            return Err(ShopError::validation("last_name", "Informe seu sobrenome."));
        }
        validate_email(&self.email)?;
        if self.password != self.confirm_password {
            return Err(ShopError::validation("confirm_password", "As senhas não coincidem."));
        }
        if !is_strong_password(&self.password) {
            return Err(ShopError::validation(
                "password",
                "Senha fraca. Use: min 8 chars, maiúscula, minúscula, número e símbolo (@$!%*?&).",
            ));
        }
        Ok(())
    }

    /// Validate and build the API payload; the email doubles as username
    pub fn into_payload(self) -> ShopResult<RegisterRequest> {
        self.validate()?;
        let email = self.email.trim().to_lowercase();
        let phone = Some(self.phone.trim().to_string()).filter(|p| !p.is_empty());
        Ok(RegisterRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: email.clone(),
            email,
            password: self.password,
            phone,
        })
    }
}

/// Minimal email shape check: something before and after a single `@`
pub fn validate_email(email: &str) -> ShopResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ShopError::validation("email", "Email inválido.")),
    }
}

/// Body of `POST /send-sms/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsRequest {
    pub phone: String,
}

impl SmsRequest {
    /// Keeps digits only; Brazilian numbers carry 10 or 11 digits without country code
    pub fn new(phone: &str) -> ShopResult<Self> {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if !(10..=13).contains(&digits.len()) {
            return Err(ShopError::validation("phone", "Telefone inválido."));
        }
        Ok(Self { phone: digits })
    }
}

/// Body of `POST /verify-sms/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsVerification {
    pub phone: String,
    pub code: String,
}

impl SmsVerification {
    pub fn new(phone: &str, code: &str) -> ShopResult<Self> {
        let SmsRequest { phone } = SmsRequest::new(phone)?;
        let code = code.trim();
        if !(4..=8).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ShopError::validation("code", "Código inválido."));
        }
        Ok(Self {
            phone,
            code: code.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Registration {
        Registration {
            first_name: "Ana".into(),
            last_name: "Souza".into(),
            email: " Ana@Joia.com ".into(),
            phone: "".into(),
            password: "Joia2024!".into(),
            confirm_password: "Joia2024!".into(),
        }
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Joia2024!"));
        assert!(!is_strong_password("joia2024!")); // no uppercase
        assert!(!is_strong_password("JOIA2024!")); // no lowercase
        assert!(!is_strong_password("JoiaJoia!")); // no digit
        assert!(!is_strong_password("Joia20245")); // no symbol
        assert!(!is_strong_password("Jo2!")); // too short
        assert!(!is_strong_password("Joia 2024!")); // space not allowed
    }

    #[test]
    fn test_registration_payload() {
        let req = form().into_payload().unwrap();
        assert_eq!(req.email, "ana@joia.com");
        assert_eq!(req.username, "ana@joia.com");
        assert!(req.phone.is_none());

        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn test_registration_rejects_mismatch() {
        let mut f = form();
        f.confirm_password = "Other2024!".into();
        let err = f.validate().unwrap_err();
        assert_eq!(err.user_message(), "As senhas não coincidem.");
    }

    #[test]
    fn test_email_check() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("ab.co").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a@bco").is_err());
    }

    #[test]
    fn test_sms_forms() {
        assert_eq!(SmsRequest::new("(11) 98765-4321").unwrap().phone, "11987654321");
        assert!(SmsRequest::new("123").is_err());

        let v = SmsVerification::new("11987654321", " 123456 ").unwrap();
        assert_eq!(v.code, "123456");
        assert!(SmsVerification::new("11987654321", "12a4").is_err());
    }

    #[test]
    fn test_address_validation_and_line() {
        let addr = NewAddress {
            zip_code: "01310-100".into(),
            street: "Av. Paulista".into(),
            number: "1000".into(),
            neighborhood: "Bela Vista".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
            ..Default::default()
        };
        assert!(addr.validate().is_ok());

        let mut bad = addr.clone();
        bad.state = "São Paulo".into();
        assert!(bad.validate().is_err());

        let saved = Address {
            id: 1,
            name: "Casa".into(),
            zip_code: addr.zip_code,
            street: addr.street,
            number: addr.number,
            complement: "Apto 12".into(),
            neighborhood: addr.neighborhood,
            city: addr.city,
            state: addr.state,
            reference_point: String::new(),
        };
        assert_eq!(
            saved.one_line(),
            "Av. Paulista, 1000 (Apto 12) - Bela Vista, São Paulo/SP - CEP 01310-100"
        );
    }
}
