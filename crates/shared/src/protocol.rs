use serde::{Deserialize, Serialize};

use crate::domain::{CityId, Course};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRequest {
    pub municipio_id: CityId,
    pub curso_nome: String,
}

impl RankingRequest {
    pub fn new(city_id: CityId, course: &Course) -> Self {
        Self {
            municipio_id: city_id,
            curso_nome: course.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStatus {
    Sucesso,
    Erro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    pub municipio_id: CityId,
    pub curso_nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ano: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    pub status: RankingStatus,
    #[serde(default)]
    pub mensagem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parametros_busca: Option<SearchParameters>,
    #[serde(default)]
    pub ranking_top_ies: Vec<RankingEntry>,
}

impl RankingResponse {
    pub fn is_error(&self) -> bool {
        self.status == RankingStatus::Erro
    }
}

/// One institution in the ranking. Values are produced upstream and are not
/// interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    #[serde(rename = "id_ies")]
    pub institution_id: String,
    #[serde(rename = "nome_ies")]
    pub institution_name: String,
    #[serde(rename = "nome_curso")]
    pub course_name: String,
    #[serde(rename = "score_qualidade")]
    pub quality_score: f64,
    #[serde(rename = "target_desempenho")]
    pub performance_class: String,
    #[serde(rename = "igc_continuo")]
    pub igc: f64,
    #[serde(rename = "idd_continuo")]
    pub idd: f64,
    #[serde(rename = "cpc_continuo")]
    pub cpc: f64,
    #[serde(rename = "taxa_conclusao")]
    pub completion_rate: f64,
    #[serde(rename = "taxa_evasao")]
    pub dropout_rate: f64,
    #[serde(rename = "taxa_concorrencia", default)]
    pub competition_ratio: Option<f64>,
    #[serde(rename = "tipo_organizacao_administrativa")]
    pub administrative_category: String,
}
