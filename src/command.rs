use std::{io, process::ExitCode};

use thiserror::Error;
use tracing::debug;

use crate::{
    alias::resolve_kind,
    client::MirrorClient,
    config::MirrorConfig,
    filter::{MirrorFilter, build_filter},
    object::MirrorObject,
    overrides::Overrides,
};

/// Why a `get` invocation ended without output.
#[derive(Debug, Error)]
pub enum GetError {
    #[error("You must specify the resource type to get, e.g. `get pods`")]
    MissingResource,
    #[error("get expects exactly one argument, got {0}")]
    TooManyArguments(usize),
    #[error("Unsupported resource type: {0}")]
    UnsupportedResource(String),
    #[error("{0:#}")]
    Client(anyhow::Error),
}

/// Terminal state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// The `get` verb: validate, resolve, query once, render.
pub struct GetCommand<C> {
    config: MirrorConfig,
    client: C,
}

impl<C: MirrorClient> GetCommand<C> {
    pub fn new(config: MirrorConfig, client: C) -> Self {
        Self { config, client }
    }

    /// Build the filter for `resource` with `overrides` layered over the config.
    pub fn filter(
        &self,
        resource: &str,
        overrides: &Overrides,
    ) -> Result<MirrorFilter, GetError> {
        let kind = resolve_kind(resource)
            .ok_or_else(|| GetError::UnsupportedResource(resource.to_string()))?;
        Ok(build_filter(kind.canonical, self.config.resolve(overrides)))
    }

    /// Run the invocation and return the objects, without rendering.
    ///
    /// `overrides` is the parsed `--kubectl-flags` value. Usage errors are detected
    /// before the client is called.
    pub async fn execute(
        &self,
        args: &[String],
        overrides: &Overrides,
    ) -> Result<Vec<MirrorObject>, GetError> {
        let resource = match args {
            [] => return Err(GetError::MissingResource),
            [resource] => resource,
            _ => return Err(GetError::TooManyArguments(args.len())),
        };

        let filter = self.filter(resource, overrides)?;
        debug!(?filter, "querying mirror");
        self.client.get(&filter).await.map_err(GetError::Client)
    }

    /// Run the invocation and render it: object names on `out`, or one error line on `err`.
    pub async fn run<O, E>(
        &self,
        args: &[String],
        overrides: &Overrides,
        out: &mut O,
        err: &mut E,
    ) -> io::Result<Outcome>
    where
        O: io::Write,
        E: io::Write,
    {
        match self.execute(args, overrides).await {
            Ok(objects) => {
                if !objects.is_empty() {
                    let names = objects
                        .iter()
                        .map(MirrorObject::name)
                        .collect::<Vec<_>>()
                        .join(" ");
                    writeln!(out, "{names}")?;
                }
                Ok(Outcome::Success)
            }
            Err(error) => {
                writeln!(err, "error: {error}")?;
                Ok(Outcome::Failure)
            }
        }
    }
}
