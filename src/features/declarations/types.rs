//! Declaration payloads. Field names follow the server's JSON.

use crate::features::auth::types::UserId;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[serde(rename = "Soltero/a")]
    Single,
    #[serde(rename = "Casado/a")]
    Married,
    #[serde(rename = "Divorciado/a")]
    Divorced,
    #[serde(rename = "Viudo/a")]
    Widowed,
}

impl MaritalStatus {
    pub const ALL: [Self; 4] = [Self::Single, Self::Married, Self::Divorced, Self::Widowed];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "Soltero/a",
            Self::Married => "Casado/a",
            Self::Divorced => "Divorciado/a",
            Self::Widowed => "Viudo/a",
        }
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for MaritalStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        match lowered.as_str() {
            "soltero/a" | "soltero" | "soltera" | "single" => Ok(Self::Single),
            "casado/a" | "casado" | "casada" | "married" => Ok(Self::Married),
            "divorciado/a" | "divorciado" | "divorciada" | "divorced" => Ok(Self::Divorced),
            "viudo/a" | "viudo" | "viuda" | "widowed" => Ok(Self::Widowed),
            _ => Err(format!("unknown marital status: {value}")),
        }
    }
}

/// Body of `POST /declarations`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewDeclaration {
    #[serde(rename = "ano_fiscal")]
    pub fiscal_year: i32,
    #[serde(rename = "ingresos_totales")]
    pub total_income: f64,
    #[serde(rename = "deducciones_aplicadas", skip_serializing_if = "Option::is_none")]
    pub deductions: Option<f64>,
    #[serde(rename = "estado_civil")]
    pub marital_status: MaritalStatus,
    #[serde(rename = "dependientes", skip_serializing_if = "Option::is_none")]
    pub dependents: Option<u32>,
    #[serde(rename = "otros_ingresos_deducciones", skip_serializing_if = "Option::is_none")]
    pub other_notes: Option<String>,
}

/// A stored declaration. The server owns `status` and `created_at`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Declaration {
    pub id: UserId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(rename = "ano_fiscal")]
    pub fiscal_year: i32,
    #[serde(rename = "ingresos_totales")]
    pub total_income: f64,
    #[serde(rename = "deducciones_aplicadas", default)]
    pub deductions: Option<f64>,
    #[serde(rename = "estado_civil")]
    pub marital_status: String,
    #[serde(rename = "dependientes", default)]
    pub dependents: Option<u32>,
    #[serde(rename = "otros_ingresos_deducciones", default)]
    pub other_notes: Option<String>,
    #[serde(rename = "estado_declaracion", default)]
    pub status: Option<String>,
    #[serde(rename = "fecha_creacion", default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DeclarationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub declaration: Option<Declaration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn marital_status_accepts_wire_values_and_aliases() {
        for status in MaritalStatus::ALL {
            assert_eq!(status.as_str().parse::<MaritalStatus>(), Ok(status));
        }
        assert_eq!("married".parse::<MaritalStatus>(), Ok(MaritalStatus::Married));
        assert_eq!(" Viuda ".parse::<MaritalStatus>(), Ok(MaritalStatus::Widowed));
        assert!("complicated".parse::<MaritalStatus>().is_err());
    }

    #[test]
    fn new_declaration_omits_empty_optionals() {
        let request = NewDeclaration {
            fiscal_year: 2024,
            total_income: 52_000.5,
            deductions: None,
            marital_status: MaritalStatus::Single,
            dependents: Some(2),
            other_notes: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "ano_fiscal": 2024,
                "ingresos_totales": 52_000.5,
                "estado_civil": "Soltero/a",
                "dependientes": 2
            })
        );
    }

    #[test]
    fn declaration_reads_server_record() {
        let declaration: Declaration = serde_json::from_value(json!({
            "id": 4,
            "user_id": 1,
            "ano_fiscal": 2023,
            "ingresos_totales": 1000.0,
            "deducciones_aplicadas": 0.0,
            "estado_civil": "Casado/a",
            "dependientes": null,
            "otros_ingresos_deducciones": null,
            "estado_declaracion": "Guardada",
            "fecha_creacion": "2024-03-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(declaration.fiscal_year, 2023);
        assert_eq!(declaration.dependents, None);
        assert_eq!(declaration.status.as_deref(), Some("Guardada"));
    }
}
