// src/checkout/checkout_validacao.rs

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::checkout_structs::{CheckoutDetails, CheckoutForm, FieldError, PaymentMethod, DELIVERY_SLOTS};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("regex de email inválida: {e}"))
});

/// Valida o formulário de checkout.
///
/// Retorna todos os campos com problema, não só o primeiro. Strings vazias contam como
/// campo ausente. `today` é a data mínima aceita para entrega.
pub fn validate_checkout(form: &CheckoutForm, today: NaiveDate) -> Result<CheckoutDetails, Vec<FieldError>> {
    let mut erros = Vec::new();

    let customer_name = required(&mut erros, "customer_name", &form.customer_name)
        .and_then(|v| max_chars(&mut erros, "customer_name", v, 255));

    let customer_email = required(&mut erros, "customer_email", &form.customer_email)
        .and_then(|v| max_chars(&mut erros, "customer_email", v, 255))
        .and_then(|v| {
            if EMAIL.is_match(v) {
                Some(v)
            } else {
                erros.push(field_error("customer_email", "deve ser um endereço de email válido"));
                None
            }
        });

    let customer_phone = optional(&form.customer_phone);
    let phone_ok = match customer_phone {
        Some(v) => max_chars(&mut erros, "customer_phone", v, 20).is_some(),
        None => true,
    };

    let delivery_address = required(&mut erros, "delivery_address", &form.delivery_address);

    let delivery_date = required(&mut erros, "delivery_date", &form.delivery_date).and_then(|v| {
        match NaiveDate::parse_from_str(v, "%Y-%m-%d") {
            Ok(data) if data >= today => Some(data),
            Ok(_) => {
                erros.push(field_error("delivery_date", "deve ser hoje ou uma data futura"));
                None
            }
            Err(_) => {
                erros.push(field_error("delivery_date", "não é uma data válida (AAAA-MM-DD)"));
                None
            }
        }
    });

    let delivery_time = required(&mut erros, "delivery_time", &form.delivery_time).and_then(|v| {
        if DELIVERY_SLOTS.iter().any(|slot| *slot == v) {
            Some(v)
        } else {
            erros.push(field_error("delivery_time", "horário de entrega indisponível"));
            None
        }
    });

    let payment_method = required(&mut erros, "payment_method", &form.payment_method).and_then(|v| {
        match v.parse::<PaymentMethod>() {
            Ok(metodo) => Some(metodo),
            Err(_) => {
                erros.push(field_error(
                    "payment_method",
                    "deve ser credit_card, paypal ou cash_on_delivery",
                ));
                None
            }
        }
    });

    match (
        customer_name,
        customer_email,
        delivery_address,
        delivery_date,
        delivery_time,
        payment_method,
    ) {
        (Some(name), Some(email), Some(address), Some(date), Some(time), Some(method))
            if phone_ok && erros.is_empty() =>
        {
            Ok(CheckoutDetails {
                customer_name: name.to_string(),
                customer_email: email.to_string(),
                customer_phone: customer_phone.map(str::to_string),
                delivery_address: address.to_string(),
                delivery_date: date,
                delivery_time: time.to_string(),
                special_instructions: optional(&form.special_instructions).map(str::to_string),
                payment_method: method,
            })
        }
        _ => Err(erros),
    }
}

fn field_error(field: &'static str, reason: &str) -> FieldError {
    FieldError {
        field,
        reason: reason.to_string(),
    }
}

fn optional(valor: &Option<String>) -> Option<&str> {
    valor.as_deref().filter(|v| !v.trim().is_empty())
}

fn required<'a>(erros: &mut Vec<FieldError>, field: &'static str, valor: &'a Option<String>) -> Option<&'a str> {
    let valor = optional(valor);
    if valor.is_none() {
        erros.push(field_error(field, "campo obrigatório"));
    }
    valor
}

fn max_chars<'a>(erros: &mut Vec<FieldError>, field: &'static str, valor: &'a str, max: usize) -> Option<&'a str> {
    if valor.chars().count() > max {
        erros.push(FieldError {
            field,
            reason: format!("deve ter no máximo {} caracteres", max),
        });
        None
    } else {
        Some(valor)
    }
}
