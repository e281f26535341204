//! Page handler
//!
//! Renders the whole page server-side: an integrity status banner and, only
//! when the load succeeded, the two-column prediction form. A failed load
//! renders the diagnostic alone; the form is absent from the output, not
//! merely disabled.

use axum::extract::State;
use axum::response::Html;

use crate::integrity::LoadError;
use crate::model::SeverityModel;
use crate::record::AccidentRecord;
use crate::AppState;

/// A classified record, ready for display.
pub struct ClassifiedResult {
    pub label: String,
    pub record: AccidentRecord,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render(&state, None))
}

/// Render the full page. `result` is filled after a form submission.
pub fn render(state: &AppState, result: Option<&ClassifiedResult>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Classificador de Acidentes</h1>");

    match &*state.engine {
        Ok(verified) => {
            body.push_str(&format!(
                "<div class=\"banner ok\">VERIFICAÇÃO DE INTEGRIDADE: hash validado.<br>\
                 <code>sha256: {}</code></div>",
                escape(&verified.digest)
            ));
            body.push_str(&render_form(&verified.model));
            if let Some(result) = result {
                body.push_str(&render_result(&verified.model.schema, result));
            }
        }
        Err(LoadError::TamperDetected { expected, computed }) => {
            body.push_str(
                "<div class=\"banner err\">ALERTA: O ARQUIVO DO MODELO FOI ADULTERADO!</div>",
            );
            body.push_str(&format!(
                "<pre>Hash Esperado:   {}\nHash Encontrado: {}</pre>",
                escape(expected),
                escape(computed)
            ));
            body.push_str(HALTED_NOTE);
        }
        Err(e) => {
            body.push_str(&format!(
                "<div class=\"banner err\">{}</div>",
                escape(&e.to_string())
            ));
            body.push_str(HALTED_NOTE);
        }
    }

    page_shell(&body)
}

const HALTED_NOTE: &str = "<p class=\"halted\">APLICAÇÃO PARADA. O modelo não pôde ser \
    carregado com segurança. Verifique MODEL_PATH e MODEL_SHA256.</p>";

/// Two columns of widgets, first half of the schema on the left.
fn render_form(model: &SeverityModel) -> String {
    let half = (model.schema.len() + 1) / 2;
    let mut columns = [String::new(), String::new()];
    for (i, field) in model.schema.iter().enumerate() {
        columns[usize::from(i >= half)].push_str(&render_widget(model, field));
    }

    format!(
        "<h2>Preencha os dados para prever a gravidade do acidente:</h2>\
         <form method=\"post\" action=\"/classify\">\
         <div class=\"columns\"><div class=\"col\">{}</div><div class=\"col\">{}</div></div>\
         <button type=\"submit\">Classificar Acidente</button>\
         </form>",
        columns[0], columns[1]
    )
}

/// One widget: a `<select>` over the model vocabulary for categorical
/// fields, a decimal `<input>` for numeric ones. Options come from the
/// loaded artifact, so the page can never offer a value the model would
/// reject.
fn render_widget(model: &SeverityModel, field: &str) -> String {
    let label = display_label(field);
    if let Some(feat) = model.categorical.get(field) {
        let options: String = feat
            .vocabulary
            .iter()
            .map(|v| format!("<option value=\"{0}\">{0}</option>", escape(v)))
            .collect();
        format!(
            "<label>{}<select name=\"{}\">{}</select></label>",
            escape(label),
            escape(field),
            options
        )
    } else {
        // km shows one decimal place, coordinates six
        let step = if field == "km" { "0.1" } else { "0.000001" };
        format!(
            "<label>{}<input type=\"number\" name=\"{}\" step=\"{}\" value=\"0\" required></label>",
            escape(label),
            escape(field),
            step
        )
    }
}

/// Decoded label plus the submitted record echoed back, in schema order.
fn render_result(schema: &[String], result: &ClassifiedResult) -> String {
    let rows: String = schema
        .iter()
        .filter_map(|field| {
            let value = result.record.display_value(field)?;
            Some(format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(field),
                escape(&value)
            ))
        })
        .collect();

    format!(
        "<div class=\"banner ok\">Classificação do Acidente: <strong>{}</strong></div>\
         <h3>Dados de Entrada:</h3>\
         <table class=\"echo\">{}</table>",
        escape(&result.label),
        rows
    )
}

/// Portuguese display label for a training column.
fn display_label(field: &str) -> &str {
    match field {
        "dia_semana" => "Dia da Semana",
        "br" => "BR",
        "km" => "KM (com casas decimais)",
        "fase_dia" => "Fase do Dia",
        "sentido_via" => "Sentido da Via",
        "condicao_metereologica" => "Condição Meteorológica",
        "tipo_pista" => "Tipo de Pista",
        "tracado_via" => "Traçado da Via",
        "latitude" => "Latitude (ex: -15.7801)",
        "longitude" => "Longitude (ex: -47.9292)",
        "delegacia" => "Delegacia",
        "postos_policiais_PRF" => "Posto Policial",
        other => other,
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn page_shell(body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>Classificador de Acidentes</title>
<style>
  body {{ font-family: sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }}
  .banner {{ padding: 0.75rem 1rem; border-radius: 6px; margin: 1rem 0; }}
  .banner.ok {{ background: #e6f4ea; border: 1px solid #34a853; }}
  .banner.err {{ background: #fce8e6; border: 1px solid #ea4335; }}
  .halted {{ color: #b3261e; font-weight: bold; }}
  .columns {{ display: flex; gap: 2rem; }}
  .col {{ flex: 1; }}
  label {{ display: block; margin-bottom: 0.75rem; }}
  select, input {{ display: block; width: 100%; margin-top: 0.25rem; padding: 0.4rem; }}
  button {{ margin-top: 1rem; padding: 0.5rem 1.5rem; }}
  table.echo {{ border-collapse: collapse; width: 100%; }}
  table.echo td {{ border: 1px solid #ccc; padding: 0.35rem 0.6rem; }}
  pre {{ background: #f5f5f5; padding: 0.75rem; overflow-x: auto; }}
</style>
</head>
<body>
{body}
</body>
</html>"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{state_failed, state_ok};
    use crate::model::test_fixtures::sample_record;

    #[test]
    fn test_verified_page_has_banner_and_form() {
        let state = state_ok();
        let html = render(&state, None);

        assert!(html.contains("VERIFICAÇÃO DE INTEGRIDADE"));
        assert!(html.contains("<form"));
        assert!(html.contains("Classificar Acidente"));
        // one widget per schema field
        for field in ["dia_semana", "br", "km", "latitude", "postos_policiais_PRF"] {
            assert!(html.contains(&format!("name=\"{}\"", field)), "missing {}", field);
        }
        // options come from the model vocabulary
        assert!(html.contains("<option value=\"segunda-feira\">"));
    }

    #[test]
    fn test_tampered_page_has_no_form_and_both_digests() {
        let expected = "a".repeat(64);
        let computed = "b".repeat(64);
        let state = state_failed(LoadError::TamperDetected {
            expected: expected.clone(),
            computed: computed.clone(),
        });
        let html = render(&state, None);

        assert!(html.contains("ADULTERADO"));
        assert!(html.contains(&expected));
        assert!(html.contains(&computed));
        assert!(html.contains("APLICAÇÃO PARADA"));
        assert!(!html.contains("<form"));
        assert!(!html.contains("<select"));
    }

    #[test]
    fn test_not_found_page_has_no_form() {
        let state = state_failed(LoadError::NotFound {
            path: "gs_gravidade.json".to_string(),
        });
        let html = render(&state, None);

        assert!(html.contains("not found"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn test_result_section_echoes_record_in_schema_order() {
        let state = state_ok();
        let result = ClassifiedResult {
            label: "Com Vítimas Feridas".to_string(),
            record: sample_record(),
        };
        let html = render(&state, Some(&result));

        assert!(html.contains("Classificação do Acidente"));
        assert!(html.contains("Com Vítimas Feridas"));
        assert!(html.contains("<td>segunda-feira</td>"));
        assert!(html.contains("<td>12.5</td>"));
        assert!(html.contains("<td>-15.780100</td>"));
        // schema order: dia_semana row comes before latitude row
        let dia = html.find("<td>dia_semana</td>").unwrap();
        let lat = html.find("<td>latitude</td>").unwrap();
        assert!(dia < lat);
    }

    #[test]
    fn test_values_are_html_escaped() {
        let state = state_ok();
        let mut record = sample_record();
        record.br = "<script>alert(1)</script>".to_string();
        let result = ClassifiedResult {
            label: "Sem Vítimas".to_string(),
            record,
        };
        let html = render(&state, Some(&result));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
