//! Customer domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::{Record, TableName, UniqueKey};
use crate::types::{Cpf, CustomerId};
use crate::validation::{FieldKind, FormValidator, ValidationErrors};

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Full name.
    #[serde(rename = "nome")]
    pub name: String,
    /// Taxpayer id, unique across customers.
    pub cpf: Cpf,
    /// Date of birth.
    #[serde(rename = "dataNascimento")]
    pub birth_date: NaiveDate,
    /// Landline number.
    #[serde(rename = "telefone")]
    pub phone: String,
    /// Mobile number.
    #[serde(rename = "celular")]
    pub mobile: String,
}

impl Record for Customer {
    type Id = CustomerId;
    const TABLE: TableName = TableName::Customers;

    fn id(&self) -> CustomerId {
        self.id
    }

    fn unique_key(&self) -> Option<UniqueKey<'_>> {
        Some(UniqueKey {
            field: "cpf",
            value: self.cpf.as_str(),
        })
    }
}

/// Editable customer fields as entered by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFields {
    pub name: String,
    /// Formatted (`NNN.NNN.NNN-NN`) or 11 raw digits.
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub mobile: String,
}

impl CustomerFields {
    /// Validate every field and return the parsed CPF.
    ///
    /// # Errors
    ///
    /// Returns all field errors found in the form.
    pub fn validate(&self) -> Result<Cpf, ValidationErrors> {
        let cpf = Cpf::parse(&self.cpf);
        FormValidator::new()
            .field("nome", FieldKind::Text, &self.name)
            .check(&cpf)
            .field("telefone", FieldKind::Phone, &self.phone)
            .field("celular", FieldKind::Mobile, &self.mobile)
            .finish()
            .and_then(|()| cpf.map_err(ValidationErrors::from))
    }

    pub(crate) fn apply(&self, customer: &mut Customer, cpf: Cpf) {
        customer.name = self.name.trim().to_owned();
        customer.cpf = cpf;
        customer.birth_date = self.birth_date;
        customer.phone = self.phone.trim().to_owned();
        customer.mobile = self.mobile.trim().to_owned();
    }

    pub(crate) fn to_customer(&self, id: CustomerId, cpf: Cpf) -> Customer {
        Customer {
            id,
            name: self.name.trim().to_owned(),
            cpf,
            birth_date: self.birth_date,
            phone: self.phone.trim().to_owned(),
            mobile: self.mobile.trim().to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields() -> CustomerFields {
        CustomerFields {
            name: " João da Silva ".to_owned(),
            cpf: "12345689010".to_owned(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            phone: "(11) 1111-1111".to_owned(),
            mobile: "(11) 99999-9999".to_owned(),
        }
    }

    #[test]
    fn test_validate_returns_formatted_cpf() {
        assert_eq!(fields().validate().unwrap().as_str(), "123.456.890-10");
    }

    #[test]
    fn test_validate_accumulates_errors() {
        let mut form = fields();
        form.name = "  ".to_owned();
        form.cpf = "123".to_owned();
        form.mobile = "(11) 1111-1111".to_owned();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.errors().len(), 3);
        assert!(errors.contains("nome"));
        assert!(errors.contains("cpf"));
        assert!(errors.contains("celular"));
        assert!(!errors.contains("telefone"));
    }

    #[test]
    fn test_to_customer_trims_text() {
        let form = fields();
        let cpf = form.validate().unwrap();
        let customer = form.to_customer(CustomerId::new(2), cpf);

        assert_eq!(customer.id, CustomerId::new(2));
        assert_eq!(customer.name, "João da Silva");
    }

    #[test]
    fn test_snapshot_field_names() {
        let form = fields();
        let cpf = form.validate().unwrap();
        let value = serde_json::to_value(form.to_customer(CustomerId::new(1), cpf)).unwrap();

        assert_eq!(value["nome"], "João da Silva");
        assert_eq!(value["dataNascimento"], "1990-01-01");
        assert_eq!(value["telefone"], "(11) 1111-1111");
        assert_eq!(value["celular"], "(11) 99999-9999");
    }
}
