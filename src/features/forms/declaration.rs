use super::{parse_optional, parse_value, FieldSpec, Form, FormKind};
use crate::{
    features::{
        declarations::{
            client,
            types::{DeclarationResponse, NewDeclaration},
        },
        validation::{rules, FieldErrors},
    },
    portal::{ApiClient, ApiError},
};
use std::future::Future;

/// New tax declaration. Resets after each success.
#[derive(Clone, Debug, Default)]
pub struct DeclarationForm {
    fiscal_year: String,
    total_income: String,
    deductions: String,
    marital_status: String,
    dependents: String,
    other_notes: String,
}

impl DeclarationForm {
    fn request(&self) -> Result<NewDeclaration, ApiError> {
        let notes = self.other_notes.trim();
        Ok(NewDeclaration {
            fiscal_year: parse_value("ano_fiscal", &self.fiscal_year)?,
            total_income: parse_value("ingresos_totales", &self.total_income)?,
            deductions: parse_optional("deducciones_aplicadas", &self.deductions)?,
            marital_status: parse_value("estado_civil", &self.marital_status)?,
            dependents: parse_optional("dependientes", &self.dependents)?,
            other_notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

impl Form for DeclarationForm {
    type Response = DeclarationResponse;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("ano_fiscal", "Fiscal year"),
        FieldSpec::text("ingresos_totales", "Total income"),
        FieldSpec::optional("deducciones_aplicadas", "Deductions"),
        FieldSpec::text("estado_civil", "Marital status"),
        FieldSpec::optional("dependientes", "Dependents"),
        FieldSpec::optional("otros_ingresos_deducciones", "Other income or deductions"),
    ];
    const KIND: FormKind = FormKind::Create;

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "ano_fiscal" => &mut self.fiscal_year,
            "ingresos_totales" => &mut self.total_income,
            "deducciones_aplicadas" => &mut self.deductions,
            "estado_civil" => &mut self.marital_status,
            "dependientes" => &mut self.dependents,
            "otros_ingresos_deducciones" => &mut self.other_notes,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn value(&self, field: &str) -> Option<&str> {
        let value = match field {
            "ano_fiscal" => &self.fiscal_year,
            "ingresos_totales" => &self.total_income,
            "deducciones_aplicadas" => &self.deductions,
            "estado_civil" => &self.marital_status,
            "dependientes" => &self.dependents,
            "otros_ingresos_deducciones" => &self.other_notes,
            _ => return None,
        };
        Some(value)
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("ano_fiscal", rules::fiscal_year(&self.fiscal_year));
        errors.check("ingresos_totales", rules::total_income(&self.total_income));
        errors.check("deducciones_aplicadas", rules::deductions(&self.deductions));
        errors.check("estado_civil", rules::marital_status(&self.marital_status));
        errors.check("dependientes", rules::dependents(&self.dependents));
        errors.check(
            "otros_ingresos_deducciones",
            rules::other_notes(&self.other_notes),
        );
        errors
    }

    fn send(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<DeclarationResponse, ApiError>> + Send {
        let request = self.request();
        async move { client::create_declaration(api, &request?).await }
    }

    fn success_notice(response: &DeclarationResponse) -> Option<String> {
        Some(
            response
                .message
                .clone()
                .unwrap_or_else(|| "Declaration saved.".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::declarations::types::MaritalStatus;

    fn form(pairs: &[(&str, &str)]) -> DeclarationForm {
        let mut form = DeclarationForm::default();
        for (field, value) in pairs {
            assert!(form.set_field(field, (*value).to_string()));
        }
        form
    }

    #[test]
    fn required_fields_are_reported() {
        let errors = DeclarationForm::default().validate();
        assert_eq!(errors.get("ano_fiscal"), Some(rules::REQUIRED));
        assert_eq!(errors.get("ingresos_totales"), Some(rules::REQUIRED));
        assert_eq!(errors.get("estado_civil"), Some(rules::REQUIRED));
        assert!(!errors.contains("deducciones_aplicadas"));
        assert!(!errors.contains("dependientes"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let errors = form(&[
            ("ano_fiscal", "1999"),
            ("ingresos_totales", "-5"),
            ("estado_civil", "Soltero/a"),
            ("dependientes", "100"),
        ])
        .validate();
        assert!(errors.contains("ano_fiscal"));
        assert!(errors.contains("ingresos_totales"));
        assert!(errors.contains("dependientes"));
        assert!(!errors.contains("estado_civil"));
    }

    #[test]
    fn builds_request_with_optionals() {
        let request = form(&[
            ("ano_fiscal", " 2024 "),
            ("ingresos_totales", "45000.75"),
            ("deducciones_aplicadas", ""),
            ("estado_civil", "divorced"),
            ("dependientes", "3"),
            ("otros_ingresos_deducciones", "  "),
        ])
        .request()
        .unwrap();
        assert_eq!(request.fiscal_year, 2024);
        assert_eq!(request.deductions, None);
        assert_eq!(request.marital_status, MaritalStatus::Divorced);
        assert_eq!(request.dependents, Some(3));
        assert_eq!(request.other_notes, None);
    }
}
