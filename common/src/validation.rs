use crate::error::{AppError, Res};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn require_non_empty(value: &str, field: &str) -> Res<()> {
    if value.trim().is_empty() {
        Err(AppError::BadRequest(format!("El campo {} es obligatorio", field)))
    } else {
        Ok(())
    }
}

/// Loose shape check; the address is confirmed by the user, not by us.
pub fn require_email(value: &str) -> Res<()> {
    let value = value.trim();
    let valid = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });
    if valid && !value.contains(char::is_whitespace) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Correo electrónico inválido".to_string()))
    }
}

pub fn require_password(value: &str) -> Res<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        Err(AppError::BadRequest(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LEN
        )))
    } else {
        Ok(())
    }
}

pub fn require_coordinates(latitude: f64, longitude: f64) -> Res<()> {
    if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Coordenadas inválidas".to_string()))
    }
}

pub fn require_non_negative(value: i64, field: &str) -> Res<()> {
    if value < 0 {
        Err(AppError::BadRequest(format!("El campo {} no puede ser negativo", field)))
    } else {
        Ok(())
    }
}

pub fn require_positive(value: i64, field: &str) -> Res<()> {
    if value <= 0 {
        Err(AppError::BadRequest(format!("El campo {} debe ser mayor a cero", field)))
    } else {
        Ok(())
    }
}
