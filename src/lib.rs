// threatscope: unified multi-platform threat scan dashboard.
//
// This is the library root. Data flows platform -> scan -> (cache, render),
// and report reads back from cache. The session controller ties the pieces
// together for the CLI and web surfaces.

pub mod backend;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod platform;
pub mod poller;
pub mod render;
pub mod report;
pub mod scan;
pub mod session;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
