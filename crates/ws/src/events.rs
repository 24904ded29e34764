//! Events pushed to connected clients

use serde::Serialize;
use uuid::Uuid;

/// Server-to-client push events.
///
/// Serialized as `{"type": "...", "data": {...}}`. Events with a `team_id`
/// of `None` are club-wide and go to every connection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WsEvent {
    GameResultUpdated {
        game_id: Uuid,
        team_id: Option<Uuid>,
        home_score: i32,
        away_score: i32,
    },
    GameScheduled {
        game_id: Uuid,
        team_id: Option<Uuid>,
        opponent: String,
    },
    EventCreated {
        event_id: Uuid,
        team_id: Option<Uuid>,
        title: String,
    },
    NewsPublished {
        news_id: Uuid,
        team_id: Option<Uuid>,
        title: String,
    },
}

impl WsEvent {
    /// The team this event is scoped to, if any.
    pub fn team_id(&self) -> Option<Uuid> {
        match self {
            WsEvent::GameResultUpdated { team_id, .. }
            | WsEvent::GameScheduled { team_id, .. }
            | WsEvent::EventCreated { team_id, .. }
            | WsEvent::NewsPublished { team_id, .. } => *team_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let id = Uuid::new_v4();
        let team = Uuid::new_v4();
        let event = WsEvent::GameResultUpdated {
            game_id: id,
            team_id: Some(team),
            home_score: 24,
            away_score: 21,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "game_result_updated");
        assert_eq!(json["data"]["home_score"], 24);
        assert_eq!(json["data"]["game_id"], id.to_string());
    }

    #[test]
    fn test_club_wide_news_has_no_team() {
        let event = WsEvent::NewsPublished {
            news_id: Uuid::new_v4(),
            team_id: None,
            title: "Season opener".to_string(),
        };
        assert_eq!(event.team_id(), None);
    }
}
