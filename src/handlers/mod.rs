//! 핸들러 모듈

pub mod connection;
pub mod matching;
pub mod result;
pub mod room;

pub use connection::{
    handle_connection, handle_disconnect, handle_heartbeat, handle_sign_in, handle_sign_out,
};
pub use matching::*;
pub use result::*;
pub use room::{
    handle_add_member, handle_create_room, handle_delete_member, handle_unwatch,
    handle_watch_room,
};
