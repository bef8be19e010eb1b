use std::sync::Arc;

use anyhow::Result;
use shared::{
    domain::{City, CityId, Course, Region},
    protocol::RankingRequest,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod projection;
pub mod query;
pub mod selection;
pub mod transport;

pub use error::{QueryError, ValidationError};
pub use projection::{project, Projection, RankingReport};
pub use query::{FetchOutcome, Generation, QueryResult, Slot};
pub use selection::{Selected, Selection, Staleness};
pub use transport::{GeographyService, HttpGeographyService, HttpRankingBackend, RankingBackend};

use config::Settings;
use query::QuerySlot;

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    SelectionChanged(Selection),
    SlotChanged(Slot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub selection: Selection,
    pub cities: QueryResult<Vec<City>>,
    pub courses: QueryResult<Vec<Course>>,
    pub ranking: QueryResult<RankingReport>,
}

impl SearchSnapshot {
    pub fn city_set(&self) -> &[City] {
        self.cities.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn course_set(&self) -> &[Course] {
        self.courses.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_loading(&self, slot: Slot) -> bool {
        match slot {
            Slot::Cities => self.cities.is_pending(),
            Slot::Courses => self.courses.is_pending(),
            Slot::Ranking => self.ranking.is_pending(),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.selection.city().is_selected()
            && self.selection.course().is_selected()
            && !self.ranking.is_pending()
    }

    pub fn projection(&self) -> Projection {
        project(&self.ranking)
    }
}

struct CoordinatorState {
    selection: Selection,
    cities: QuerySlot<Vec<City>>,
    courses: QuerySlot<Vec<Course>>,
    ranking: QuerySlot<RankingReport>,
}

impl CoordinatorState {
    fn new() -> Self {
        Self {
            selection: Selection::default(),
            cities: QuerySlot::new(Slot::Cities),
            courses: QuerySlot::new(Slot::Courses),
            ranking: QuerySlot::new(Slot::Ranking),
        }
    }

    fn invalidate(&mut self, signal: Staleness) -> (Option<PendingFetch>, Vec<Slot>) {
        match signal {
            Staleness::CitySet { region } => {
                let generation = self.cities.begin();
                self.courses.clear();
                self.ranking.clear();
                (
                    Some(PendingFetch::Cities { region, generation }),
                    vec![Slot::Cities, Slot::Courses, Slot::Ranking],
                )
            }
            Staleness::CourseSet { city } => {
                let generation = self.courses.begin();
                self.ranking.clear();
                (
                    Some(PendingFetch::Courses { city, generation }),
                    vec![Slot::Courses, Slot::Ranking],
                )
            }
            Staleness::CourseSetCleared => {
                self.courses.clear();
                self.ranking.clear();
                (None, vec![Slot::Courses, Slot::Ranking])
            }
        }
    }
}

fn working_set<T>(slot: &QuerySlot<Vec<T>>) -> &[T] {
    slot.result().data().map(Vec::as_slice).unwrap_or_default()
}

enum PendingFetch {
    Cities {
        region: Region,
        generation: Generation,
    },
    Courses {
        city: CityId,
        generation: Generation,
    },
}

/// Drives the region → cities → courses → ranking chain.
pub struct SearchCoordinator {
    geography: Arc<dyn GeographyService>,
    backend: Arc<dyn RankingBackend>,
    inner: Mutex<CoordinatorState>,
    events: broadcast::Sender<CoordinatorEvent>,
}

impl SearchCoordinator {
    pub fn new(
        geography: Arc<dyn GeographyService>,
        backend: Arc<dyn RankingBackend>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            geography,
            backend,
            inner: Mutex::new(CoordinatorState::new()),
            events,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Arc<Self>> {
        let http = transport::build_http_client(settings.request_timeout())?;
        let geography = HttpGeographyService::from_settings(http.clone(), settings)?;
        let backend = HttpRankingBackend::from_settings(http, settings)?;
        Ok(Self::new(Arc::new(geography), Arc::new(backend)))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        let guard = self.inner.lock().await;
        SearchSnapshot {
            selection: guard.selection.clone(),
            cities: guard.cities.result().clone(),
            courses: guard.courses.result().clone(),
            ranking: guard.ranking.result().clone(),
        }
    }

    pub async fn projection(&self) -> Projection {
        project(self.inner.lock().await.ranking.result())
    }

    pub async fn start(&self) -> FetchOutcome {
        let (pending, changed) = {
            let mut guard = self.inner.lock().await;
            let region = guard.selection.region();
            guard.invalidate(Staleness::CitySet { region })
        };
        self.emit_slots(&changed);
        self.run(pending).await
    }

    pub async fn set_region(&self, region: Region) -> FetchOutcome {
        let (pending, changed, selection) = {
            let mut guard = self.inner.lock().await;
            let signal = guard.selection.set_region(region);
            let (pending, changed) = guard.invalidate(signal);
            (pending, changed, guard.selection.clone())
        };
        info!(%region, "coordinator: region changed");
        self.emit_selection(selection);
        self.emit_slots(&changed);
        self.run(pending).await
    }

    /// Selects (or clears, with `None`) the city. Ids outside the latest
    /// city-set are ignored.
    pub async fn select_city(&self, city: Option<&CityId>) -> FetchOutcome {
        let (pending, changed, selection) = {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            let Some(signal) = state.selection.set_city(city, working_set(&state.cities)) else {
                return FetchOutcome::NotIssued;
            };
            let (pending, changed) = state.invalidate(signal);
            (pending, changed, state.selection.clone())
        };
        info!(city = ?city, "coordinator: city changed");
        self.emit_selection(selection);
        self.emit_slots(&changed);
        self.run(pending).await
    }

    pub async fn select_course(&self, course: Option<&str>) -> bool {
        let selection = {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            if !state
                .selection
                .set_course(course, working_set(&state.courses))
            {
                return false;
            }
            state.selection.clone()
        };
        self.emit_selection(selection);
        true
    }

    pub async fn reset(&self) -> FetchOutcome {
        let (pending, changed, selection) = {
            let mut guard = self.inner.lock().await;
            let signal = guard.selection.reset();
            let (pending, changed) = guard.invalidate(signal);
            (pending, changed, guard.selection.clone())
        };
        info!("coordinator: selection reset");
        self.emit_selection(selection);
        self.emit_slots(&changed);
        self.run(pending).await
    }

    pub async fn submit(&self) -> Result<FetchOutcome, ValidationError> {
        let (generation, request, city_name, course_name) = {
            let mut guard = self.inner.lock().await;
            let (city, course) = match (
                guard.selection.city().as_option(),
                guard.selection.course().as_option(),
            ) {
                (Some(city), Some(course)) => (city.clone(), course.clone()),
                (None, None) => return Err(ValidationError::MissingCityAndCourse),
                (None, Some(_)) => return Err(ValidationError::MissingCity),
                (Some(_), None) => return Err(ValidationError::MissingCourse),
            };
            let generation = guard.ranking.begin();
            (
                generation,
                RankingRequest::new(city.id.clone(), &course),
                city.name,
                course.name,
            )
        };
        info!(
            city = %request.municipio_id,
            course = %request.curso_nome,
            generation = %generation,
            "coordinator: ranking requested"
        );
        self.emit_slots(&[Slot::Ranking]);

        let result = self
            .backend
            .fetch_ranking(&request)
            .await
            .map(|response| RankingReport {
                city_name,
                course_name,
                response,
            });
        if let Err(err) = &result {
            warn!(%err, "coordinator: ranking request failed");
        }

        let outcome = self.inner.lock().await.ranking.resolve(generation, result);
        if outcome == FetchOutcome::Applied {
            self.emit_slots(&[Slot::Ranking]);
        }
        Ok(outcome)
    }

    async fn run(&self, pending: Option<PendingFetch>) -> FetchOutcome {
        match pending {
            None => FetchOutcome::NotIssued,
            Some(PendingFetch::Cities { region, generation }) => {
                let result = self.geography.list_cities(region).await;
                match &result {
                    Ok(cities) => {
                        info!(%region, count = cities.len(), generation = %generation, "coordinator: cities loaded")
                    }
                    Err(err) => warn!(%region, %err, "coordinator: city request failed"),
                }
                let outcome = self.inner.lock().await.cities.resolve(generation, result);
                if outcome == FetchOutcome::Applied {
                    self.emit_slots(&[Slot::Cities]);
                }
                outcome
            }
            Some(PendingFetch::Courses { city, generation }) => {
                let result = self.backend.list_courses(&city).await;
                match &result {
                    Ok(courses) => {
                        info!(%city, count = courses.len(), generation = %generation, "coordinator: courses loaded")
                    }
                    Err(err) => warn!(%city, %err, "coordinator: course request failed"),
                }
                let outcome = self.inner.lock().await.courses.resolve(generation, result);
                if outcome == FetchOutcome::Applied {
                    self.emit_slots(&[Slot::Courses]);
                }
                outcome
            }
        }
    }

    fn emit_selection(&self, selection: Selection) {
        let _ = self.events.send(CoordinatorEvent::SelectionChanged(selection));
    }

    fn emit_slots(&self, slots: &[Slot]) {
        for slot in slots {
            let _ = self.events.send(CoordinatorEvent::SlotChanged(*slot));
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
