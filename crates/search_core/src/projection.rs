use shared::protocol::{RankingEntry, RankingResponse};

use crate::query::QueryResult;

const GENERIC_UPSTREAM_ERROR: &str = "The ranking service reported an error.";

/// Payload of a successful ranking query. Names are captured when the search
/// is submitted so the heading matches the request that produced the entries.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingReport {
    pub city_name: String,
    pub course_name: String,
    pub response: RankingResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Prompt,
    Loading,
    Ranking {
        entries: Vec<RankingEntry>,
        course_name: String,
        city_name: String,
    },
    Empty {
        course_name: String,
    },
    Error {
        message: String,
    },
}

pub fn project(result: &QueryResult<RankingReport>) -> Projection {
    match result {
        QueryResult::Idle => Projection::Prompt,
        QueryResult::Pending(_) => Projection::Loading,
        QueryResult::Failed(err) => Projection::Error {
            message: err.user_message(),
        },
        QueryResult::Succeeded(report) if report.response.is_error() => Projection::Error {
            message: report
                .response
                .mensagem
                .clone()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| GENERIC_UPSTREAM_ERROR.to_string()),
        },
        QueryResult::Succeeded(report) if report.response.ranking_top_ies.is_empty() => {
            Projection::Empty {
                course_name: report.course_name.clone(),
            }
        }
        QueryResult::Succeeded(report) => Projection::Ranking {
            entries: report.response.ranking_top_ies.clone(),
            course_name: report.course_name.clone(),
            city_name: report.city_name.clone(),
        },
    }
}
