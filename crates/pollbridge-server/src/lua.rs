//! Lua command payloads understood by the host
//!
//! The bridge treats command bodies as opaque; this module is the one place
//! that knows the `lua` command's request shape and the scripts the admin
//! handlers send.

use serde::{Deserialize, Serialize};

/// Evaluate a Lua chunk on the host; the reply result is its return value
pub const COMMAND_LUA: &str = "lua";

/// Tell the host that installed mods changed on disk
pub const COMMAND_NOTIFY_MODS_CHANGED: &str = "notify_mods_changed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuaRequest {
    pub code: String,
}

impl LuaRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Escape a value for interpolation inside a single- or double-quoted Lua string
pub fn sanitize_lua_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}

pub const BAN_DB_STATUS: &str = r#"
local banned = 0
local total = 0
for _, entry in ipairs(xban.db) do
    total = total + 1
    if entry.banned then
        banned = banned + 1
    end
end
return { total = total, banned = banned }
"#;

pub const BANNED_RECORDS: &str = r#"
local banned = {}
for _, entry in ipairs(xban.db) do
    if entry.banned then
        table.insert(banned, entry)
    end
end
return banned
"#;

pub const CLEANUP_BAN_DB: &str = r#"
local db = xban.db
local old_count = #db
local i = 1
while i <= #db do
    if not db[i].banned then
        table.remove(db, i)
    else
        i = i + 1
    end
end
return {
    removed = (old_count - #db),
    retained = #db
}
"#;

/// Look up one player's xban entry
pub fn find_entry(playername: &str) -> LuaRequest {
    LuaRequest::new(format!(
        "return xban.find_entry('{}')",
        sanitize_lua_string(playername)
    ))
}

/// Ban a player; `seconds = None` bans permanently
pub fn ban_player(playername: &str, source: &str, seconds: Option<i64>, reason: &str) -> LuaRequest {
    let duration = seconds.map_or_else(|| "nil".to_string(), |s| s.to_string());
    LuaRequest::new(format!(
        "return xban.ban_player('{}', '{}', {}, '{}')",
        sanitize_lua_string(playername),
        sanitize_lua_string(source),
        duration,
        sanitize_lua_string(reason),
    ))
}

pub fn unban_player(playername: &str, source: &str) -> LuaRequest {
    LuaRequest::new(format!(
        "return xban.unban_player('{}', '{}')",
        sanitize_lua_string(playername),
        sanitize_lua_string(source),
    ))
}
