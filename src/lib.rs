#![cfg_attr(not(doctest), doc = include_str!("../README.md"))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use clap_complete;
pub use k8s_openapi;
pub use kube;

pub mod alias;
pub use alias::{MirrorKind, resolve_kind};
pub mod claputil;
pub use claputil::resource_value_completer;
pub mod client;
pub use client::{KubeMirrorClient, MirrorClient};
pub mod command;
pub use command::{GetCommand, GetError, Outcome};
pub mod config;
pub use config::{MirrorConfig, Resolved};
pub mod filter;
pub use filter::{MirrorFilter, build_filter};
pub mod object;
pub use object::MirrorObject;
pub mod overrides;
pub use overrides::Overrides;
pub mod retry;
