pub mod board;
pub mod campaign;
pub mod ids;
pub mod preset;
pub mod user;

pub use board::{
    // Database models
    BoardListingRow, BoardRow, TileRow,
    // API payloads
    BoardCreated, BoardStanding, BoardSummary, BoardView, CampaignResults, SubmitBoardRequest,
    TileSubmission, TileView, UpdateBoardRequest,
};
pub use campaign::{
    // Database models
    CampaignRow, CategoryRow, ItemRow,
    // Domain types
    BoardSize, CallStatus, CampaignDraft, CategoryDraft, CategoryKind, CategoryType,
    // API payloads
    CallRequest, CallResponse, CampaignCreated, CampaignSummary, CampaignView, CategoryView,
    ItemView, NewCampaign, NewCategory,
};
pub use ids::{BoardId, CampaignId, CategoryId, ItemId, UserId};
pub use preset::BackgroundPreset;
pub use user::{LoginRequest, NewUser, TokenResponse, UpdateUserRequest, User, UserResponse};
