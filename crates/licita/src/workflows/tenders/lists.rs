use super::domain::TenderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names of the user-editable option lists backing the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListKind {
    Empresas,
    Portais,
    Categorias,
    Situacoes,
    ModosDisputa,
    Responsaveis,
    StatusAtual,
    Posicoes,
    FasesProcesso,
}

impl ListKind {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::Empresas,
            Self::Portais,
            Self::Categorias,
            Self::Situacoes,
            Self::ModosDisputa,
            Self::Responsaveis,
            Self::StatusAtual,
            Self::Posicoes,
            Self::FasesProcesso,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Empresas => "empresas",
            Self::Portais => "portais",
            Self::Categorias => "categorias",
            Self::Situacoes => "situacoes",
            Self::ModosDisputa => "modosDisputa",
            Self::Responsaveis => "responsaveis",
            Self::StatusAtual => "statusAtual",
            Self::Posicoes => "posicoes",
            Self::FasesProcesso => "fasesProcesso",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown list '{0}'")]
pub struct UnknownList(pub String);

impl FromStr for ListKind {
    type Err = UnknownList;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ordered()
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownList(wanted.to_string()))
    }
}

/// Option lists referenced by tenders. Removing an option never touches tenders using it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicLists {
    #[serde(default)]
    pub empresas: Vec<String>,
    #[serde(default)]
    pub portais: Vec<String>,
    #[serde(default)]
    pub categorias: Vec<String>,
    #[serde(default)]
    pub situacoes: Vec<String>,
    #[serde(default)]
    pub modos_disputa: Vec<String>,
    #[serde(default)]
    pub responsaveis: Vec<String>,
    #[serde(default)]
    pub status_atual: Vec<String>,
    #[serde(default)]
    pub posicoes: Vec<String>,
    #[serde(default)]
    pub fases_processo: Vec<String>,
}

impl Default for DynamicLists {
    fn default() -> Self {
        fn owned(values: &[&str]) -> Vec<String> {
            values.iter().map(|value| value.to_string()).collect()
        }

        Self {
            empresas: owned(&["Construtora ABC Ltda", "Empresa XYZ S.A.", "Tech Solutions"]),
            portais: owned(&["Compras.gov", "Licitações-e", "BLL", "Portal Nacional"]),
            categorias: owned(&[
                "Engenharia",
                "Tecnologia da Informação",
                "Serviços",
                "Material",
                "Consultoria",
            ]),
            situacoes: owned(&["Triagem", "Em Disputa", "Suspenso", "Homologado"]),
            modos_disputa: owned(&["Aberto", "Fechado", "Aberto/Fechado", "Não Aplicável"]),
            responsaveis: owned(&["João Queiroz", "Maria Silva", "Pedro Santos", "Ana Costa"]),
            status_atual: TenderStatus::ordered()
                .into_iter()
                .map(|status| status.label().to_string())
                .collect(),
            posicoes: owned(&[
                "N/A",
                "1º Lugar",
                "2º Lugar",
                "3º Lugar",
                "Desclassificado",
                "Perdendo",
            ]),
            fases_processo: owned(&[
                "Lances",
                "Negociação",
                "Habilitação",
                "Intenção de Recurso",
                "Adjudicação",
                "Homologação",
                "Suspenso",
            ]),
        }
    }
}

impl DynamicLists {
    pub fn get(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Empresas => &self.empresas,
            ListKind::Portais => &self.portais,
            ListKind::Categorias => &self.categorias,
            ListKind::Situacoes => &self.situacoes,
            ListKind::ModosDisputa => &self.modos_disputa,
            ListKind::Responsaveis => &self.responsaveis,
            ListKind::StatusAtual => &self.status_atual,
            ListKind::Posicoes => &self.posicoes,
            ListKind::FasesProcesso => &self.fases_processo,
        }
    }

    fn get_mut(&mut self, kind: ListKind) -> &mut Vec<String> {
        match kind {
            ListKind::Empresas => &mut self.empresas,
            ListKind::Portais => &mut self.portais,
            ListKind::Categorias => &mut self.categorias,
            ListKind::Situacoes => &mut self.situacoes,
            ListKind::ModosDisputa => &mut self.modos_disputa,
            ListKind::Responsaveis => &mut self.responsaveis,
            ListKind::StatusAtual => &mut self.status_atual,
            ListKind::Posicoes => &mut self.posicoes,
            ListKind::FasesProcesso => &mut self.fases_processo,
        }
    }

    /// Append a trimmed option. Blank input is ignored and reported as `false`.
    pub fn add(&mut self, kind: ListKind, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        self.get_mut(kind).push(value.to_string());
        true
    }

    pub fn remove(&mut self, kind: ListKind, index: usize) -> Option<String> {
        let list = self.get_mut(kind);
        if index < list.len() {
            Some(list.remove(index))
        } else {
            None
        }
    }
}
