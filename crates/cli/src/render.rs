//! Plain-text rendering of command output.

use std::io::{self, Write};

use cadastro_core::{Address, Customer, Notice, Registry};

/// Write a notice on its own line.
pub fn notice(out: &mut impl Write, notice: &Notice) -> io::Result<()> {
    writeln!(out, "{notice}")
}

/// Table of every customer with its principal address.
pub fn customers(out: &mut impl Write, registry: &Registry) -> io::Result<()> {
    let customers = registry.list_customers();
    if customers.is_empty() {
        return writeln!(out, "No customers registered.");
    }

    writeln!(
        out,
        "{:>4}  {:<28}  {:<14}  {:<10}  {:<15}  {:<15}  PRINCIPAL ADDRESS",
        "ID", "NAME", "CPF", "BORN", "PHONE", "MOBILE"
    )?;
    for customer in customers {
        let principal = registry
            .principal_address(customer.id)
            .map_or_else(|| "-".to_owned(), address_line);
        customer_row(out, customer, &principal)?;
    }
    Ok(())
}

fn customer_row(out: &mut impl Write, customer: &Customer, principal: &str) -> io::Result<()> {
    writeln!(
        out,
        "{:>4}  {:<28}  {:<14}  {:<10}  {:<15}  {:<15}  {principal}",
        customer.id.as_i32(),
        customer.name,
        customer.cpf.as_str(),
        customer.birth_date.format("%Y-%m-%d"),
        customer.phone,
        customer.mobile,
    )
}

/// Table of one customer's addresses. The principal one is starred.
pub fn addresses(out: &mut impl Write, customer: &Customer, addresses: &[&Address]) -> io::Result<()> {
    writeln!(out, "Addresses of {} ({})", customer.name, customer.cpf)?;
    if addresses.is_empty() {
        return writeln!(out, "  none");
    }

    for address in addresses {
        let marker = if address.principal { '*' } else { ' ' };
        writeln!(
            out,
            "{marker} {:>4}  {}",
            address.id.as_i32(),
            address_line(address)
        )?;
    }
    Ok(())
}

fn address_line(address: &Address) -> String {
    format!(
        "{}, {} - {}, {}/{} - {}",
        address.street,
        address.neighborhood,
        address.postal_code,
        address.city,
        address.state,
        address.country
    )
}
