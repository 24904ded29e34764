//! Row-visibility scopes derived from the caller's role
//!
//! Instead of per-endpoint role ladders, every handler asks the backend for
//! a [`VisibilityScope`] and applies the same two questions everywhere:
//! which teams can this caller see, and which individual players. The scope
//! is re-derived per request from current DB state.

use uuid::Uuid;

use crate::types::UserRole;

/// Team visibility: everything, or an explicit id list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamScope {
    All,
    Teams(Vec<Uuid>),
}

/// What the authenticated caller is allowed to see.
///
/// - Admin / supervisor: all teams, all players
/// - Coach: the teams they coach
/// - Player: their own team plus their own player row
/// - Parent: their children's teams plus their children's player rows
#[derive(Debug, Clone)]
pub struct VisibilityScope {
    pub role: UserRole,
    teams: TeamScope,
    /// Players visible independent of team membership (self, or children)
    player_ids: Vec<Uuid>,
    /// The caller's own player row, when they have one
    own_player_id: Option<Uuid>,
}

impl VisibilityScope {
    /// Unrestricted scope for staff with club-wide visibility.
    pub fn all(role: UserRole) -> Self {
        Self {
            role,
            teams: TeamScope::All,
            player_ids: Vec::new(),
            own_player_id: None,
        }
    }

    /// Empty scope for callers with no linked player or children yet.
    /// They still see club-wide records, nothing team- or player-bound.
    pub fn none(role: UserRole) -> Self {
        Self {
            role,
            teams: TeamScope::Teams(Vec::new()),
            player_ids: Vec::new(),
            own_player_id: None,
        }
    }

    /// Coach scope over an explicit team list.
    pub fn coached_teams(team_ids: Vec<Uuid>) -> Self {
        Self {
            role: UserRole::Coach,
            teams: TeamScope::Teams(team_ids),
            player_ids: Vec::new(),
            own_player_id: None,
        }
    }

    /// Player scope: own player row and (when assigned) own team.
    pub fn own_player(player_id: Uuid, team_id: Option<Uuid>) -> Self {
        Self {
            role: UserRole::Player,
            teams: TeamScope::Teams(team_id.into_iter().collect()),
            player_ids: vec![player_id],
            own_player_id: Some(player_id),
        }
    }

    /// Parent scope: children's player rows and their teams.
    pub fn children(child_player_ids: Vec<Uuid>, child_team_ids: Vec<Uuid>) -> Self {
        Self {
            role: UserRole::Parent,
            teams: TeamScope::Teams(child_team_ids),
            player_ids: child_player_ids,
            own_player_id: None,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self.teams, TeamScope::All)
    }

    /// Team ids for SQL filtering. `None` means no filter (see everything).
    pub fn team_ids(&self) -> Option<&[Uuid]> {
        match &self.teams {
            TeamScope::All => None,
            TeamScope::Teams(ids) => Some(ids),
        }
    }

    /// Player ids visible regardless of team filter (self or children).
    /// Empty for staff scopes.
    pub fn extra_player_ids(&self) -> &[Uuid] {
        &self.player_ids
    }

    pub fn own_player_id(&self) -> Option<Uuid> {
        self.own_player_id
    }

    /// Whether a team-scoped record is visible. Records without a team
    /// (club-wide events, unassigned games) are visible to everyone.
    pub fn allows_team(&self, team_id: Option<Uuid>) -> bool {
        match (&self.teams, team_id) {
            (TeamScope::All, _) => true,
            (TeamScope::Teams(_), None) => true,
            (TeamScope::Teams(ids), Some(id)) => ids.contains(&id),
        }
    }

    /// Whether a specific player row is visible. Unlike [`allows_team`],
    /// a player without a team assignment is only visible through the
    /// explicit player list, so parents never see unrelated unassigned
    /// players.
    ///
    /// [`allows_team`]: VisibilityScope::allows_team
    pub fn allows_player(&self, player_id: Uuid, player_team_id: Option<Uuid>) -> bool {
        if self.is_unrestricted() || self.player_ids.contains(&player_id) {
            return true;
        }
        match (&self.teams, player_team_id) {
            (TeamScope::Teams(ids), Some(team)) => ids.contains(&team),
            _ => false,
        }
    }

    /// Whether the caller may manage a team's roster, games and events.
    /// Only staff scopes qualify; coaches only for their own teams.
    pub fn can_manage_team(&self, team_id: Uuid) -> bool {
        if !self.role.is_staff() {
            return false;
        }
        match &self.teams {
            TeamScope::All => true,
            TeamScope::Teams(ids) => ids.contains(&team_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_scope_sees_everything() {
        let scope = VisibilityScope::all(UserRole::Admin);
        assert!(scope.is_unrestricted());
        assert!(scope.allows_team(Some(Uuid::new_v4())));
        assert!(scope.allows_team(None));
        assert!(scope.allows_player(Uuid::new_v4(), None));
        assert!(scope.can_manage_team(Uuid::new_v4()));
        assert!(scope.team_ids().is_none());
    }

    #[test]
    fn test_coach_scope_limited_to_own_teams() {
        let mine = Uuid::new_v4();
        let other = Uuid::new_v4();
        let scope = VisibilityScope::coached_teams(vec![mine]);

        assert!(scope.allows_team(Some(mine)));
        assert!(!scope.allows_team(Some(other)));
        assert!(scope.allows_team(None));
        assert!(scope.can_manage_team(mine));
        assert!(!scope.can_manage_team(other));
        assert_eq!(scope.team_ids(), Some(&[mine][..]));
    }

    #[test]
    fn test_player_scope_covers_self_and_teammates() {
        let me = Uuid::new_v4();
        let my_team = Uuid::new_v4();
        let teammate = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let scope = VisibilityScope::own_player(me, Some(my_team));

        assert!(scope.allows_player(me, Some(my_team)));
        assert!(scope.allows_player(teammate, Some(my_team)));
        assert!(!scope.allows_player(stranger, Some(Uuid::new_v4())));
        assert_eq!(scope.own_player_id(), Some(me));
        assert!(!scope.can_manage_team(my_team));
    }

    #[test]
    fn test_unassigned_player_scope_sees_only_self() {
        let me = Uuid::new_v4();
        let scope = VisibilityScope::own_player(me, None);

        assert!(scope.allows_player(me, None));
        assert!(!scope.allows_player(Uuid::new_v4(), None));
        assert_eq!(scope.team_ids(), Some(&[][..]));
    }

    #[test]
    fn test_parent_scope_does_not_leak_unassigned_players() {
        let child = Uuid::new_v4();
        let child_team = Uuid::new_v4();
        let scope = VisibilityScope::children(vec![child], vec![child_team]);

        assert!(scope.allows_player(child, Some(child_team)));
        assert!(scope.allows_player(Uuid::new_v4(), Some(child_team)));
        assert!(!scope.allows_player(Uuid::new_v4(), None));
        // Club-wide records stay visible
        assert!(scope.allows_team(None));
    }
}
