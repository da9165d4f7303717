use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Roles of the Mafia variant
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Mafia,
    Doctor,
    Police,
    /// Catch-all role for every slot the distribution leaves open
    Citizen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Team {
    Mafia,
    Citizen,
}

/// What a role does when it acts at night
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NightActionKind {
    Kill,
    Save,
    Investigate,
}

/// Static description of a role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleInfo {
    pub name: &'static str,
    pub team: Team,
    pub description: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub night_action: Option<NightActionKind>,
    pub win_condition: &'static str,
}

const MAFIA_WIN: &str = "Win when the mafia equal or outnumber everyone else";
const CITIZEN_WIN: &str = "Win when every mafia member has been eliminated";

impl Role {
    pub fn info(self) -> RoleInfo {
        match self {
            Role::Mafia => RoleInfo {
                name: "Mafia",
                team: Team::Mafia,
                description: "Choose one player to eliminate each night.",
                color: "#e94560",
                icon: "🔪",
                night_action: Some(NightActionKind::Kill),
                win_condition: MAFIA_WIN,
            },
            Role::Doctor => RoleInfo {
                name: "Doctor",
                team: Team::Citizen,
                description: "Choose one player to protect from the mafia each night.",
                color: "#2ecc71",
                icon: "💉",
                night_action: Some(NightActionKind::Save),
                win_condition: CITIZEN_WIN,
            },
            Role::Police => RoleInfo {
                name: "Police",
                team: Team::Citizen,
                description: "Investigate one player each night to learn if they are mafia.",
                color: "#3498db",
                icon: "👮",
                night_action: Some(NightActionKind::Investigate),
                win_condition: CITIZEN_WIN,
            },
            Role::Citizen => RoleInfo {
                name: "Citizen",
                team: Team::Citizen,
                description: "No special ability. Find the mafia and vote them out by day.",
                color: "#4ecdc4",
                icon: "👤",
                night_action: None,
                win_condition: CITIZEN_WIN,
            },
        }
    }

    pub fn team(self) -> Team {
        self.info().team
    }

    pub fn night_action(self) -> Option<NightActionKind> {
        self.info().night_action
    }

    pub fn acts_at_night(self) -> bool {
        self.night_action().is_some()
    }
}

pub fn roles_by_team(team: Team) -> Vec<Role> {
    Role::iter().filter(|role| role.team() == team).collect()
}

/// Number of players per role, citizens included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleDistribution {
    pub mafia: usize,
    pub doctor: usize,
    pub police: usize,
    pub citizen: usize,
}

impl RoleDistribution {
    pub fn total(&self) -> usize {
        self.mafia + self.doctor + self.police + self.citizen
    }
}

/// Suggested distribution for a table of `player_count`; needs at least 4 players.
pub fn default_role_distribution(player_count: usize) -> Option<RoleDistribution> {
    let (mafia, doctor, police) = match player_count {
        0..=3 => return None,
        4 => (1, 0, 1),
        5 => (1, 1, 1),
        6..=9 => (2, 1, 1),
        10..=12 => (3, 1, 1),
        n => (n / 3, 1, 1),
    };
    Some(RoleDistribution {
        mafia,
        doctor,
        police,
        citizen: player_count - mafia - doctor - police,
    })
}
