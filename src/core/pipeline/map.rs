//! Route-dispatch middleware.
//!
//! `map` and `map_when` compile one [`Route`] per supplied path, build an
//! isolated branch pipeline from a cloned builder and register a single
//! middleware that scans the routes in order. The first match whose
//! predicate passes dispatches to the branch and short-circuits; a predicate
//! rejection gates that one route, so scanning continues with the remaining
//! routes before falling through to `next`.
use std::sync::Arc;

use eyre::Result;

use crate::core::{
    context::{FetchContext, LogLevel},
    pipeline::{HandlerFuture, PipelineBuilder, RequestDelegate},
    route::{Route, RouteSettings, RouteVariables},
};

/// Extra gate over a matched route, evaluated against the extracted
/// variables.
pub type RoutePredicate = Arc<dyn Fn(&FetchContext, &RouteVariables) -> bool + Send + Sync>;

/// One or many route pattern strings.
pub struct RoutePaths(Vec<String>);

impl From<&str> for RoutePaths {
    fn from(path: &str) -> Self {
        Self(vec![path.to_string()])
    }
}

impl From<String> for RoutePaths {
    fn from(path: String) -> Self {
        Self(vec![path])
    }
}

impl From<Vec<String>> for RoutePaths {
    fn from(paths: Vec<String>) -> Self {
        Self(paths)
    }
}

impl From<Vec<&str>> for RoutePaths {
    fn from(paths: Vec<&str>) -> Self {
        Self(paths.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for RoutePaths {
    fn from(paths: &[&str]) -> Self {
        Self(paths.iter().map(|path| path.to_string()).collect())
    }
}

struct MapOptions {
    routes: Vec<Route>,
    predicate: Option<RoutePredicate>,
    branch: RequestDelegate,
}

fn map_middleware(options: Arc<MapOptions>, next: RequestDelegate) -> RequestDelegate {
    Arc::new(move |mut ctx: FetchContext| -> HandlerFuture {
        let options = Arc::clone(&options);
        let next = Arc::clone(&next);
        Box::pin(async move {
            for route in &options.routes {
                if !route.is_match(&ctx.request) {
                    continue;
                }

                if let Some(predicate) = &options.predicate {
                    let variables = route.get_variables(&ctx.request);
                    if !predicate(&ctx, &variables) {
                        // The predicate gates this route only.
                        continue;
                    }
                }

                ctx.log(
                    LogLevel::Debug,
                    format!("route '{}' matched; dispatching to branch", route.pattern),
                );
                return (options.branch)(ctx).await;
            }

            next(ctx).await
        })
    })
}

impl PipelineBuilder {
    /// Dispatch matching requests to an isolated branch pipeline.
    pub fn map<F>(&mut self, paths: impl Into<RoutePaths>, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut PipelineBuilder),
    {
        self.map_routes(paths.into(), RouteSettings::default(), None, configure)
    }

    /// [`PipelineBuilder::map`] with explicit route settings.
    pub fn map_with<F>(
        &mut self,
        paths: impl Into<RoutePaths>,
        settings: RouteSettings,
        configure: F,
    ) -> Result<&mut Self>
    where
        F: FnOnce(&mut PipelineBuilder),
    {
        self.map_routes(paths.into(), settings, None, configure)
    }

    /// [`PipelineBuilder::map`] with an extra predicate over the extracted
    /// route variables.
    pub fn map_when<P, F>(
        &mut self,
        paths: impl Into<RoutePaths>,
        predicate: P,
        configure: F,
    ) -> Result<&mut Self>
    where
        P: Fn(&FetchContext, &RouteVariables) -> bool + Send + Sync + 'static,
        F: FnOnce(&mut PipelineBuilder),
    {
        self.map_routes(
            paths.into(),
            RouteSettings::default(),
            Some(Arc::new(predicate)),
            configure,
        )
    }

    /// [`PipelineBuilder::map_when`] with explicit route settings.
    pub fn map_when_with<P, F>(
        &mut self,
        paths: impl Into<RoutePaths>,
        predicate: P,
        settings: RouteSettings,
        configure: F,
    ) -> Result<&mut Self>
    where
        P: Fn(&FetchContext, &RouteVariables) -> bool + Send + Sync + 'static,
        F: FnOnce(&mut PipelineBuilder),
    {
        self.map_routes(paths.into(), settings, Some(Arc::new(predicate)), configure)
    }

    fn map_routes<F>(
        &mut self,
        paths: RoutePaths,
        settings: RouteSettings,
        predicate: Option<RoutePredicate>,
        configure: F,
    ) -> Result<&mut Self>
    where
        F: FnOnce(&mut PipelineBuilder),
    {
        let mut branch_builder = self.clone();
        configure(&mut branch_builder);
        let branch = branch_builder.build();

        let origin = self.config().origin.clone();
        let routes = paths
            .0
            .iter()
            .map(|path| Route::with_settings(path, &origin, settings.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let options = Arc::new(MapOptions {
            routes,
            predicate,
            branch,
        });

        self.use_middleware(move |next| map_middleware(Arc::clone(&options), next));
        Ok(self)
    }
}
