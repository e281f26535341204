//! The twelve-field accident input record.
//!
//! Field names follow the training data's column names (Portuguese), which
//! is also what the HTML form and the JSON API use on the wire. The record
//! is built once per classify request and discarded after display.

use serde::{Deserialize, Serialize};

/// One accident scenario submitted for classification.
///
/// All twelve fields are required. Categorical fields are validated against
/// the loaded model's vocabularies at predict time, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    pub dia_semana: String,
    pub br: String,
    pub km: f64,
    pub fase_dia: String,
    pub sentido_via: String,
    pub condicao_metereologica: String,
    pub tipo_pista: String,
    pub tracado_via: String,
    pub latitude: f64,
    pub longitude: f64,
    pub delegacia: String,
    #[serde(rename = "postos_policiais_PRF")]
    pub postos_policiais_prf: String,
}

impl AccidentRecord {
    /// Value of a categorical field, by training column name.
    pub fn categorical_value(&self, field: &str) -> Option<&str> {
        match field {
            "dia_semana" => Some(&self.dia_semana),
            "br" => Some(&self.br),
            "fase_dia" => Some(&self.fase_dia),
            "sentido_via" => Some(&self.sentido_via),
            "condicao_metereologica" => Some(&self.condicao_metereologica),
            "tipo_pista" => Some(&self.tipo_pista),
            "tracado_via" => Some(&self.tracado_via),
            "delegacia" => Some(&self.delegacia),
            "postos_policiais_PRF" => Some(&self.postos_policiais_prf),
            _ => None,
        }
    }

    /// Value of a numeric field, by training column name.
    pub fn numeric_value(&self, field: &str) -> Option<f64> {
        match field {
            "km" => Some(self.km),
            "latitude" => Some(self.latitude),
            "longitude" => Some(self.longitude),
            _ => None,
        }
    }

    /// Field rendered for display. Numeric fields keep their fixed
    /// precision: one decimal for km, six for latitude/longitude.
    pub fn display_value(&self, field: &str) -> Option<String> {
        if let Some(v) = self.categorical_value(field) {
            return Some(v.to_string());
        }
        match field {
            "km" => Some(format!("{:.1}", self.km)),
            "latitude" => Some(format!("{:.6}", self.latitude)),
            "longitude" => Some(format!("{:.6}", self.longitude)),
            _ => None,
        }
    }
}
