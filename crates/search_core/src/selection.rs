use shared::domain::{City, CityId, Course, Region};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selected<T> {
    #[default]
    Unset,
    Selected(T),
}

impl<T> Selected<T> {
    pub fn is_selected(&self) -> bool {
        matches!(self, Selected::Selected(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Selected::Selected(value) => Some(value),
            Selected::Unset => None,
        }
    }
}

/// Signal from the selection to the orchestrator that a working set is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    CitySet { region: Region },
    CourseSet { city: CityId },
    CourseSetCleared,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    region: Region,
    city: Selected<City>,
    course: Selected<Course>,
}

impl Selection {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn city(&self) -> &Selected<City> {
        &self.city
    }

    pub fn course(&self) -> &Selected<Course> {
        &self.course
    }

    pub fn set_region(&mut self, region: Region) -> Staleness {
        self.region = region;
        self.city = Selected::Unset;
        self.course = Selected::Unset;
        Staleness::CitySet { region }
    }

    /// Selects a city from `city_set` (the latest fetched for the current
    /// region). Returns `None` when nothing changed.
    pub fn set_city(&mut self, city: Option<&CityId>, city_set: &[City]) -> Option<Staleness> {
        let Some(id) = city else {
            let was_empty = !self.city.is_selected() && !self.course.is_selected();
            self.city = Selected::Unset;
            self.course = Selected::Unset;
            return (!was_empty).then_some(Staleness::CourseSetCleared);
        };

        if self.city.as_option().is_some_and(|current| &current.id == id) {
            return None;
        }

        let Some(found) = city_set.iter().find(|candidate| &candidate.id == id) else {
            warn!(
                city = %id,
                region = %self.region,
                "selection: ignoring city outside the current city-set"
            );
            return None;
        };

        self.city = Selected::Selected(found.clone());
        self.course = Selected::Unset;
        Some(Staleness::CourseSet {
            city: found.id.clone(),
        })
    }

    pub fn set_course(&mut self, course: Option<&str>, course_set: &[Course]) -> bool {
        let next = match course {
            None => Selected::Unset,
            Some(name) => match course_set.iter().find(|candidate| candidate.name == name) {
                Some(found) => Selected::Selected(found.clone()),
                None => {
                    warn!(
                        course = name,
                        city = ?self.city.as_option().map(|city| &city.id),
                        "selection: ignoring course outside the current course-set"
                    );
                    return false;
                }
            },
        };

        if next == self.course {
            return false;
        }
        self.course = next;
        true
    }

    pub fn reset(&mut self) -> Staleness {
        let default_region = Region::default();
        let region_changed = self.region != default_region;
        self.region = default_region;
        self.city = Selected::Unset;
        self.course = Selected::Unset;
        if region_changed {
            Staleness::CitySet {
                region: default_region,
            }
        } else {
            Staleness::CourseSetCleared
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Vec<City> {
        vec![
            City::new("2927408", "Salvador"),
            City::new("2910800", "Feira de Santana"),
        ]
    }

    fn courses() -> Vec<Course> {
        vec![Course::new("Engenharia de Software"), Course::new("Direito")]
    }

    fn selected_salvador_software() -> Selection {
        let mut selection = Selection::default();
        selection.set_city(Some(&CityId::new("2927408")), &cities());
        selection.set_course(Some("Engenharia de Software"), &courses());
        selection
    }

    #[test]
    fn region_change_clears_city_and_course() {
        let mut selection = selected_salvador_software();

        let signal = selection.set_region(Region::SP);

        assert_eq!(signal, Staleness::CitySet { region: Region::SP });
        assert_eq!(selection.region(), Region::SP);
        assert_eq!(selection.city(), &Selected::Unset);
        assert_eq!(selection.course(), &Selected::Unset);
    }

    #[test]
    fn setting_same_region_still_invalidates() {
        let mut selection = selected_salvador_software();
        let signal = selection.set_region(Region::BA);
        assert_eq!(signal, Staleness::CitySet { region: Region::BA });
        assert!(!selection.city().is_selected());
    }

    #[test]
    fn city_change_clears_course_and_requests_course_set() {
        let mut selection = selected_salvador_software();

        let signal = selection.set_city(Some(&CityId::new("2910800")), &cities());

        assert_eq!(
            signal,
            Some(Staleness::CourseSet {
                city: CityId::new("2910800")
            })
        );
        assert_eq!(
            selection.city().as_option().map(|city| city.name.as_str()),
            Some("Feira de Santana")
        );
        assert_eq!(selection.course(), &Selected::Unset);
    }

    #[test]
    fn unknown_city_is_a_no_op() {
        let mut selection = selected_salvador_software();
        let before = selection.clone();

        assert_eq!(selection.set_city(Some(&CityId::new("0000000")), &cities()), None);
        assert_eq!(selection, before);
    }

    #[test]
    fn reselecting_current_city_keeps_course() {
        let mut selection = selected_salvador_software();
        assert_eq!(selection.set_city(Some(&CityId::new("2927408")), &cities()), None);
        assert!(selection.course().is_selected());
    }

    #[test]
    fn clearing_city_clears_course_set() {
        let mut selection = selected_salvador_software();
        assert_eq!(
            selection.set_city(None, &cities()),
            Some(Staleness::CourseSetCleared)
        );
        assert!(!selection.course().is_selected());
        assert_eq!(selection.set_city(None, &cities()), None);
    }

    #[test]
    fn course_outside_course_set_is_rejected() {
        let mut selection = selected_salvador_software();
        assert!(!selection.set_course(Some("Medicina"), &courses()));
        assert_eq!(
            selection.course().as_option().map(|course| course.name.as_str()),
            Some("Engenharia de Software")
        );
        assert!(selection.set_course(None, &courses()));
        assert!(!selection.course().is_selected());
    }

    #[test]
    fn reset_refetches_cities_only_when_region_changes() {
        let mut selection = selected_salvador_software();
        assert_eq!(selection.reset(), Staleness::CourseSetCleared);
        assert!(!selection.city().is_selected());

        selection.set_region(Region::RJ);
        assert_eq!(selection.reset(), Staleness::CitySet { region: Region::BA });
        assert_eq!(selection.region(), Region::BA);
    }
}
