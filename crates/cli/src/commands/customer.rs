//! Customer management commands.
//!
//! # Usage
//!
//! ```bash
//! # Register a customer together with its first (principal) address
//! cadastro customer register --name "Maria Souza" --cpf 98765432100 \
//!     --birth-date 1985-04-12 --phone 1133334444 --mobile 11988887777 \
//!     --cep 01310100 --street "Av. Paulista" --neighborhood "Bela Vista" \
//!     --city "São Paulo" --state SP
//!
//! cadastro customer update 2 --mobile 11977776666
//! cadastro customer delete 2 --yes
//! cadastro customer list
//! ```

use std::io::{self, BufRead, Write};

use cadastro_core::{
    Customer, CustomerFields, CustomerId, FieldKind, Notice, Registry, ServiceError,
};
use chrono::NaiveDate;
use clap::Args;
use tracing::warn;

use super::address::AddressForm;
use super::{Outcome, masked};
use crate::error::CliError;
use crate::render;

/// Every customer field, as typed on the command line.
#[derive(Debug, Clone, Args)]
pub struct CustomerForm {
    #[arg(long)]
    pub name: String,

    /// `NNN.NNN.NNN-NN` or 11 digits
    #[arg(long)]
    pub cpf: String,

    #[arg(long, value_name = "YYYY-MM-DD")]
    pub birth_date: NaiveDate,

    /// Landline, `(NN) NNNN-NNNN` or 10 digits
    #[arg(long)]
    pub phone: String,

    /// Mobile, `(NN) NNNNN-NNNN` or 11 digits
    #[arg(long)]
    pub mobile: String,
}

impl CustomerForm {
    pub fn to_fields(&self) -> CustomerFields {
        CustomerFields {
            name: self.name.clone(),
            cpf: masked(FieldKind::Cpf, &self.cpf),
            birth_date: self.birth_date,
            phone: masked(FieldKind::Phone, &self.phone),
            mobile: masked(FieldKind::Mobile, &self.mobile),
        }
    }
}

/// Customer fields to change; omitted ones keep their current value.
#[derive(Debug, Clone, Default, Args)]
pub struct CustomerPatch {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub cpf: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD")]
    pub birth_date: Option<NaiveDate>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub mobile: Option<String>,
}

impl CustomerPatch {
    fn apply_to(&self, current: &Customer) -> CustomerFields {
        let or_current = |value: Option<&String>, kind: FieldKind, current: &str| {
            value.map_or_else(|| current.to_owned(), |v| masked(kind, v))
        };

        CustomerFields {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            cpf: or_current(self.cpf.as_ref(), FieldKind::Cpf, current.cpf.as_str()),
            birth_date: self.birth_date.unwrap_or(current.birth_date),
            phone: or_current(self.phone.as_ref(), FieldKind::Phone, &current.phone),
            mobile: or_current(self.mobile.as_ref(), FieldKind::Mobile, &current.mobile),
        }
    }
}

/// Register a customer and its first address.
///
/// The customer is removed again when its first address is rejected, so no
/// customer is left without an address.
///
/// # Errors
///
/// Returns `CliError::Service` for invalid fields or a taken CPF.
pub fn register(
    registry: &mut Registry,
    form: &CustomerForm,
    address: &AddressForm,
) -> Result<Outcome, CliError> {
    let id = registry.register_customer(&form.to_fields())?;

    if let Err(e) = registry.create_address(id, &address.to_fields(), true) {
        warn!(customer_id = %id, "First address rejected, discarding customer");
        registry.discard_incomplete_customer(id)?;
        return Err(e.into());
    }

    Ok(Outcome::changed(Notice::success(format!(
        "Customer {} registered (id {id})",
        form.name.trim()
    ))))
}

/// Change a customer's fields.
///
/// # Errors
///
/// Returns `CliError::Service` for invalid fields, a taken CPF or an unknown
/// customer.
pub fn update(
    registry: &mut Registry,
    id: CustomerId,
    patch: &CustomerPatch,
) -> Result<Outcome, CliError> {
    let current = registry
        .get_customer(id)
        .ok_or(ServiceError::CustomerNotFound(id))?;
    let fields = patch.apply_to(current);

    registry.update_customer(id, &fields)?;
    Ok(Outcome::changed(Notice::success(format!(
        "Customer {id} updated"
    ))))
}

/// Delete a customer and its addresses after confirmation.
///
/// With `assume_yes` the confirmation is skipped; otherwise the prompt is
/// answered on standard input.
///
/// # Errors
///
/// Returns `CliError::Service` for an unknown customer.
pub fn delete(registry: &mut Registry, id: CustomerId, assume_yes: bool) -> Result<Outcome, CliError> {
    let confirm = |prompt: &str| assume_yes || ask(prompt);

    if registry.delete_customer(id, &confirm)? {
        Ok(Outcome::changed(Notice::success(format!(
            "Customer {id} deleted"
        ))))
    } else {
        Ok(Outcome::unchanged(Notice::info("Nothing deleted")))
    }
}

/// Print every customer.
///
/// # Errors
///
/// Returns `CliError::Output` if writing fails.
pub fn list(registry: &Registry, out: &mut impl Write) -> Result<Outcome, CliError> {
    render::customers(out, registry).map_err(CliError::Output)?;
    Ok(Outcome::read_only())
}

/// Ask a yes/no question on the terminal. Anything but yes declines.
fn ask(prompt: &str) -> bool {
    let mut stderr = io::stderr();
    if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
        return false;
    }

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .is_ok_and(|_| is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    )
}
