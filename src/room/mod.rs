// Room registry: live rooms, their phase timers and the HTTP room browser

// Public API - what other modules can use
pub use game_room::GameRoom;
pub use handlers::{
    get_room, health, list_keyword_categories, list_roles, list_rooms, HealthResponse,
    KeywordCategoriesResponse, RoleCatalogResponse,
};
pub use manager::GameManager;
pub use timer::PhaseTimer;
pub use types::{GameKind, GameSettings, RoomStatus, RoomSummary};

// Internal modules
mod game_room;
mod handlers;
mod manager;
mod timer;
mod types;
