use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M";

/// Phase label applied when a dispute is closed and documents go under review.
pub const QUALIFICATION_PHASE: &str = "Habilitação / Documentação";
/// Phase label during which the appeal window fields are meaningful.
pub const APPEAL_INTENT_PHASE: &str = "Intenção de Recurso";
/// Placeholder ranking used before a position is known.
pub const UNKNOWN_POSITION: &str = "N/A";

/// Identifier wrapper for tracked bid processes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenderId(pub String);

impl TenderId {
    pub fn generate() -> Self {
        let mut raw = uuid::Uuid::new_v4().simple().to_string();
        raw.truncate(12);
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operational status of a bid process. Transitions are chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenderStatus {
    #[serde(rename = "Triagem")]
    Triagem,
    #[serde(rename = "Aguardando Disputa")]
    AguardandoDisputa,
    #[serde(rename = "Em Disputa")]
    EmDisputa,
    #[serde(rename = "Habilitação", alias = "Habilitacao")]
    Habilitacao,
    #[serde(rename = "Recurso")]
    Recurso,
    #[serde(rename = "Homologação", alias = "Homologacao")]
    Homologacao,
    #[serde(rename = "Suspenso")]
    Suspenso,
}

impl TenderStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Triagem,
            Self::AguardandoDisputa,
            Self::EmDisputa,
            Self::Habilitacao,
            Self::Recurso,
            Self::Homologacao,
            Self::Suspenso,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Triagem => "Triagem",
            Self::AguardandoDisputa => "Aguardando Disputa",
            Self::EmDisputa => "Em Disputa",
            Self::Habilitacao => "Habilitação",
            Self::Recurso => "Recurso",
            Self::Homologacao => "Homologação",
            Self::Suspenso => "Suspenso",
        }
    }

    /// Statuses from which the dispute can still be closed.
    pub const fn dispute_open(self) -> bool {
        matches!(
            self,
            Self::Triagem | Self::AguardandoDisputa | Self::EmDisputa
        )
    }

    pub const fn in_dispute(self) -> bool {
        matches!(self, Self::AguardandoDisputa | Self::EmDisputa)
    }
}

impl fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tender status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for TenderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = fold_label(value);
        Self::ordered()
            .into_iter()
            .find(|status| fold_label(status.label()) == wanted)
            .ok_or_else(|| UnknownStatus(value.trim().to_string()))
    }
}

fn fold_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
            'ú' | 'Ú' => 'u',
            'ç' | 'Ç' => 'c',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Price ceiling the bid is evaluated against, selected by `tipoLicitacao`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipoLicitacao")]
pub enum FinancialCeiling {
    /// Lowest acceptable absolute price.
    Valor {
        #[serde(rename = "valorMinimo", default, deserialize_with = "null_as_zero")]
        valor_minimo: f64,
    },
    /// Largest discount percentage the company accepts.
    Desconto {
        #[serde(
            rename = "percentualDesconto",
            default,
            deserialize_with = "null_as_zero"
        )]
        percentual_desconto: f64,
    },
}

impl FinancialCeiling {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Valor { .. } => "Valor",
            Self::Desconto { .. } => "Desconto",
        }
    }

    pub const fn amount(&self) -> f64 {
        match self {
            Self::Valor { valor_minimo } => *valor_minimo,
            Self::Desconto {
                percentual_desconto,
            } => *percentual_desconto,
        }
    }
}

impl Default for FinancialCeiling {
    fn default() -> Self {
        Self::Valor { valor_minimo: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotType {
    #[default]
    Unico,
    Multiplos,
}

/// Independently ranked sub-division of a tender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub numero: String,
    pub colocacao: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_ofertado: Option<f64>,
}

/// Deadline and grounds for an appeal. Only meaningful during [`APPEAL_INTENT_PHASE`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealWindow {
    #[serde(default, with = "optional_date")]
    pub data_limite_recurso: Option<NaiveDate>,
    #[serde(default, with = "optional_time")]
    pub hora_limite_recurso: Option<NaiveTime>,
    #[serde(default)]
    pub contra_proposta: bool,
    #[serde(default)]
    pub contra_habilitacao: bool,
}

/// Ranking that governs the tender, as decided by its lot structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectivePosition<'a> {
    Single(&'a str),
    PerLot(Vec<(&'a str, &'a str)>),
}

/// Next follow-up the team committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    pub date: NaiveDate,
    /// `None` when the portal may resume at any time.
    pub time: Option<NaiveTime>,
}

/// One tracked bid process and its mutable operational state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: TenderId,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub empresa: String,
    #[serde(default)]
    pub orgao_licitante: String,
    #[serde(default)]
    pub numero_edital: String,
    #[serde(default)]
    pub portal: String,
    #[serde(default)]
    pub objeto: String,
    #[serde(default)]
    pub categoria: String,
    #[serde(default)]
    pub situacao: String,
    #[serde(default)]
    pub modo_disputa: String,
    #[serde(default)]
    pub responsavel: String,

    #[serde(default, with = "optional_date")]
    pub data_abertura: Option<NaiveDate>,
    #[serde(default, with = "optional_time")]
    pub horario_sessao: Option<NaiveTime>,
    #[serde(default, with = "optional_date")]
    pub prazo_impugnacao: Option<NaiveDate>,
    #[serde(default, with = "optional_date")]
    pub prazo_esclarecimento: Option<NaiveDate>,
    #[serde(default, with = "optional_date")]
    pub data_retorno: Option<NaiveDate>,
    #[serde(default, with = "optional_time")]
    pub horario_retorno: Option<NaiveTime>,
    #[serde(default)]
    pub retorno_qualquer_horario: bool,

    #[serde(default, deserialize_with = "null_as_zero")]
    pub valor_referencia: f64,
    #[serde(default)]
    pub validade_proposta: String,
    #[serde(default)]
    pub exige_garantia: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_garantia: Option<f64>,
    #[serde(default)]
    pub proposta_enviada: bool,
    #[serde(flatten)]
    pub ceiling: FinancialCeiling,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_final: Option<f64>,

    pub status_atual: TenderStatus,
    #[serde(default)]
    pub fase_atual: String,
    #[serde(default = "default_position")]
    pub posicao_atual: String,
    #[serde(default)]
    pub tipo_lote: LotType,
    #[serde(default)]
    pub lotes: Vec<Lot>,
    #[serde(flatten)]
    pub appeal: AppealWindow,

    #[serde(default)]
    pub observacoes: String,
    #[serde(default)]
    pub observacoes_pregao: String,
}

fn default_position() -> String {
    UNKNOWN_POSITION.to_string()
}

impl Tender {
    pub fn effective_position(&self) -> EffectivePosition<'_> {
        match self.tipo_lote {
            LotType::Unico => EffectivePosition::Single(&self.posicao_atual),
            LotType::Multiplos => EffectivePosition::PerLot(
                self.lotes
                    .iter()
                    .map(|lot| (lot.numero.as_str(), lot.colocacao.as_str()))
                    .collect(),
            ),
        }
    }

    pub fn follow_up(&self) -> Option<FollowUp> {
        self.data_retorno.map(|date| FollowUp {
            date,
            time: if self.retorno_qualquer_horario {
                None
            } else {
                self.horario_retorno
            },
        })
    }

    pub fn in_appeal_intent(&self) -> bool {
        self.fase_atual.trim() == APPEAL_INTENT_PHASE
    }

    /// Short label used on agenda and calendar cards.
    pub fn headline(&self) -> String {
        match (self.numero_edital.is_empty(), self.orgao_licitante.is_empty()) {
            (false, false) => format!("{} - {}", self.numero_edital, self.orgao_licitante),
            (false, true) => self.numero_edital.clone(),
            (true, false) => self.orgao_licitante.clone(),
            (true, true) => self.id.to_string(),
        }
    }
}

/// Registration form payload. Every field may be left blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenderDraft {
    pub empresa: String,
    pub orgao_licitante: String,
    pub numero_edital: String,
    pub portal: String,
    pub objeto: String,
    pub categoria: String,
    pub situacao: Option<String>,
    pub modo_disputa: String,
    pub responsavel: String,
    #[serde(with = "optional_date")]
    pub data_abertura: Option<NaiveDate>,
    #[serde(with = "optional_time")]
    pub horario_sessao: Option<NaiveTime>,
    #[serde(with = "optional_date")]
    pub prazo_impugnacao: Option<NaiveDate>,
    #[serde(with = "optional_date")]
    pub prazo_esclarecimento: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_zero")]
    pub valor_referencia: f64,
    pub validade_proposta: Option<String>,
    pub exige_garantia: bool,
    pub valor_garantia: Option<f64>,
    pub proposta_enviada: bool,
    #[serde(flatten)]
    pub ceiling: Option<FinancialCeiling>,
    pub status_atual: Option<TenderStatus>,
    pub posicao_atual: Option<String>,
    pub fase_atual: Option<String>,
    pub tipo_lote: LotType,
    pub lotes: Vec<Lot>,
    pub observacoes: String,
}

impl TenderDraft {
    pub fn into_tender(self, id: TenderId, created_at: DateTime<Utc>) -> Tender {
        Tender {
            id,
            created_at,
            empresa: self.empresa,
            orgao_licitante: self.orgao_licitante,
            numero_edital: self.numero_edital,
            portal: self.portal,
            objeto: self.objeto,
            categoria: self.categoria,
            situacao: self
                .situacao
                .unwrap_or_else(|| TenderStatus::Triagem.label().to_string()),
            modo_disputa: self.modo_disputa,
            responsavel: self.responsavel,
            data_abertura: self.data_abertura,
            horario_sessao: self.horario_sessao,
            prazo_impugnacao: self.prazo_impugnacao,
            prazo_esclarecimento: self.prazo_esclarecimento,
            data_retorno: None,
            horario_retorno: None,
            retorno_qualquer_horario: false,
            valor_referencia: self.valor_referencia,
            validade_proposta: self.validade_proposta.unwrap_or_else(|| "60".to_string()),
            exige_garantia: self.exige_garantia,
            valor_garantia: self.valor_garantia,
            proposta_enviada: self.proposta_enviada,
            ceiling: self.ceiling.unwrap_or_default(),
            valor_final: None,
            status_atual: self.status_atual.unwrap_or(TenderStatus::Triagem),
            fase_atual: self.fase_atual.unwrap_or_else(|| "Lances".to_string()),
            posicao_atual: self.posicao_atual.unwrap_or_else(default_position),
            tipo_lote: self.tipo_lote,
            lotes: self.lotes,
            appeal: AppealWindow::default(),
            observacoes: self.observacoes,
            observacoes_pregao: String::new(),
        }
    }
}

/// Amounts cleared in the form are stored as `null`; they read back as zero.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Calendar dates persisted as `YYYY-MM-DD`, with `""` standing for absent.
pub(crate) mod optional_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        parse(raw.as_deref()).map_err(de::Error::custom)
    }

    pub(crate) fn parse(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
                .map(Some)
                .map_err(|err| format!("failed to parse '{value}' as YYYY-MM-DD ({err})")),
        }
    }
}

/// Wall-clock times persisted as `HH:MM`, with `""` standing for absent.
pub(crate) mod optional_time {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.collect_str(&time.format(TIME_FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        parse(raw.as_deref()).map_err(de::Error::custom)
    }

    pub(crate) fn parse(raw: Option<&str>) -> Result<Option<NaiveTime>, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => NaiveTime::parse_from_str(value, TIME_FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
                .map(Some)
                .map_err(|err| format!("failed to parse '{value}' as HH:MM ({err})")),
        }
    }
}
