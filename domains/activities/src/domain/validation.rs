//! Validation rules for activities

use chrono::{DateTime, Utc};
use uuid::Uuid;

use clubdesk_common::Error;

use crate::domain::entities::EventVisibility;

/// The single thing an attendance record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceTarget {
    Game(Uuid),
    Event(Uuid),
}

impl AttendanceTarget {
    /// Enforce the exactly-one-of rule: a record must reference a game
    /// or an event, never neither and never both.
    pub fn from_options(game_id: Option<Uuid>, event_id: Option<Uuid>) -> Result<Self, Error> {
        match (game_id, event_id) {
            (Some(game), None) => Ok(Self::Game(game)),
            (None, Some(event)) => Ok(Self::Event(event)),
            (None, None) => Err(Error::Validation(
                "Either game_id or event_id is required".to_string(),
            )),
            (Some(_), Some(_)) => Err(Error::Validation(
                "Only one of game_id or event_id may be set".to_string(),
            )),
        }
    }

    pub fn game_id(&self) -> Option<Uuid> {
        match self {
            Self::Game(id) => Some(*id),
            Self::Event(_) => None,
        }
    }

    pub fn event_id(&self) -> Option<Uuid> {
        match self {
            Self::Event(id) => Some(*id),
            Self::Game(_) => None,
        }
    }
}

/// Events must end after they start.
pub fn validate_event_times(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<(), Error> {
    if ends_at <= starts_at {
        return Err(Error::Validation(
            "Event must end after it starts".to_string(),
        ));
    }
    Ok(())
}

/// Visibility and its target field must agree.
pub fn validate_event_visibility(
    visibility: EventVisibility,
    team_id: Option<Uuid>,
    age_group: Option<&str>,
) -> Result<(), Error> {
    match visibility {
        EventVisibility::Team if team_id.is_none() => Err(Error::Validation(
            "Team events require a team_id".to_string(),
        )),
        EventVisibility::AgeGroup if age_group.is_none() => Err(Error::Validation(
            "Age group events require an age_group".to_string(),
        )),
        EventVisibility::ClubWide if team_id.is_some() => Err(Error::Validation(
            "Club-wide events cannot name a team".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_attendance_target_exactly_one() {
        let game = Uuid::new_v4();
        let event = Uuid::new_v4();

        assert_eq!(
            AttendanceTarget::from_options(Some(game), None).unwrap(),
            AttendanceTarget::Game(game)
        );
        assert_eq!(
            AttendanceTarget::from_options(None, Some(event)).unwrap(),
            AttendanceTarget::Event(event)
        );
        assert!(AttendanceTarget::from_options(None, None).is_err());
        assert!(AttendanceTarget::from_options(Some(game), Some(event)).is_err());
    }

    #[test]
    fn test_event_times_must_be_ordered() {
        let start = Utc::now();
        assert!(validate_event_times(start, start + Duration::hours(2)).is_ok());
        assert!(validate_event_times(start, start).is_err());
        assert!(validate_event_times(start, start - Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_event_visibility_targets() {
        let team = Some(Uuid::new_v4());

        assert!(validate_event_visibility(EventVisibility::Team, team, None).is_ok());
        assert!(validate_event_visibility(EventVisibility::Team, None, None).is_err());
        assert!(validate_event_visibility(EventVisibility::ClubWide, None, None).is_ok());
        assert!(validate_event_visibility(EventVisibility::ClubWide, team, None).is_err());
        assert!(validate_event_visibility(EventVisibility::AgeGroup, None, Some("U16")).is_ok());
        assert!(validate_event_visibility(EventVisibility::AgeGroup, None, None).is_err());
    }
}
