use crate::workflows::tenders::domain::{optional_date, optional_time, FinancialCeiling, TenderDraft};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("row {row}: {message}")]
    Invalid { row: usize, message: String },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub(crate) fn parse_drafts<R: Read>(reader: R) -> Result<Vec<TenderDraft>, RowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut drafts = Vec::new();

    for (index, record) in csv_reader.deserialize::<TenderRow>().enumerate() {
        let row = record?;
        let draft = row.into_draft().map_err(|message| RowError::Invalid {
            row: index + 1,
            message,
        })?;
        drafts.push(draft);
    }

    Ok(drafts)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenderRow {
    #[serde(default)]
    empresa: String,
    #[serde(default)]
    orgao_licitante: String,
    #[serde(default)]
    numero_edital: String,
    #[serde(default)]
    portal: String,
    #[serde(default)]
    objeto: String,
    #[serde(default)]
    categoria: String,
    #[serde(default)]
    responsavel: String,
    #[serde(default)]
    modo_disputa: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    data_abertura: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    horario_sessao: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    prazo_impugnacao: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    prazo_esclarecimento: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    valor_referencia: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tipo_licitacao: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    valor_minimo: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    percentual_desconto: Option<String>,
}

impl TenderRow {
    fn into_draft(self) -> Result<TenderDraft, String> {
        let ceiling = match self.tipo_licitacao.as_deref().map(str::to_ascii_lowercase) {
            None => match (&self.valor_minimo, &self.percentual_desconto) {
                (None, None) => None,
                (Some(_), None) => Some(FinancialCeiling::Valor {
                    valor_minimo: parse_amount("valorMinimo", self.valor_minimo.as_deref())?,
                }),
                (None, Some(_)) => Some(FinancialCeiling::Desconto {
                    percentual_desconto: parse_amount(
                        "percentualDesconto",
                        self.percentual_desconto.as_deref(),
                    )?,
                }),
                (Some(_), Some(_)) => {
                    return Err(
                        "tipoLicitacao is required when both valorMinimo and percentualDesconto are filled"
                            .to_string(),
                    )
                }
            },
            Some(kind) if kind == "valor" => Some(FinancialCeiling::Valor {
                valor_minimo: parse_amount("valorMinimo", self.valor_minimo.as_deref())?,
            }),
            Some(kind) if kind == "desconto" => Some(FinancialCeiling::Desconto {
                percentual_desconto: parse_amount(
                    "percentualDesconto",
                    self.percentual_desconto.as_deref(),
                )?,
            }),
            Some(other) => return Err(format!("unknown tipoLicitacao '{other}'")),
        };

        Ok(TenderDraft {
            empresa: self.empresa,
            orgao_licitante: self.orgao_licitante,
            numero_edital: self.numero_edital,
            portal: self.portal,
            objeto: self.objeto,
            categoria: self.categoria,
            responsavel: self.responsavel,
            modo_disputa: self.modo_disputa,
            data_abertura: optional_date::parse(self.data_abertura.as_deref())?,
            horario_sessao: optional_time::parse(self.horario_sessao.as_deref())?,
            prazo_impugnacao: optional_date::parse(self.prazo_impugnacao.as_deref())?,
            prazo_esclarecimento: optional_date::parse(self.prazo_esclarecimento.as_deref())?,
            valor_referencia: parse_amount("valorReferencia", self.valor_referencia.as_deref())?,
            ceiling,
            ..TenderDraft::default()
        })
    }
}

/// Accepts `1234.56` as well as the Brazilian `1.234,56`.
fn parse_amount(field: &str, raw: Option<&str>) -> Result<f64, String> {
    let Some(raw) = raw else {
        return Ok(0.0);
    };
    let cleaned = raw.trim().trim_start_matches("R$").trim().replace(' ', "");
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .ok_or_else(|| format!("{field} '{raw}' is not a valid amount"))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
