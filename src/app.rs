use crate::{
    AppContext,
    actions::{self, Command, Next},
    navigation::{Landing, Location, MAX_REDIRECTS, Navigator},
    routes::{Router, ViewId},
    views::{self, Message, Screen, ViewOutcome},
};

/// App
///
/// The navigation driver. Combines the navigator with the context and turns every
/// landing into exactly one rendered `Screen`. Each dispatch bumps the render
/// generation and stamps it on the screen it produces; `is_current` tells a
/// consumer whether a screen it holds has been superseded.
pub struct App {
    ctx: AppContext,
    navigator: Navigator,
    screen: Option<Screen>,
    current: Option<(ViewId, Option<String>)>,
    generation: u64,
    dispatches: u64,
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        Self::with_router(ctx, Router::default())
    }

    pub fn with_router(ctx: AppContext, router: Router) -> Self {
        Self {
            ctx,
            navigator: Navigator::new(router, Location::default()),
            screen: None,
            current: None,
            generation: 0,
            dispatches: 0,
        }
    }

    // --- Accessors ---

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn location(&self) -> &str {
        self.navigator.location().fragment()
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    /// Identifier the current screen was routed with, if any.
    pub fn current_param(&self) -> Option<&str> {
        self.current.as_ref().and_then(|(_, param)| param.as_deref())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total number of view dispatches so far.
    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    pub fn is_current(&self, screen: &Screen) -> bool {
        screen.generation == self.generation
    }

    // --- Navigation ---

    /// Renders the configured start fragment.
    pub async fn start(&mut self) -> &Screen {
        let start = self.ctx.config.start_fragment.clone();
        tracing::info!(fragment = %start, "starting");
        self.navigate_to(&start).await
    }

    /// navigate_to
    ///
    /// Programmatic navigation. Writes the fragment, follows guard redirects and
    /// dispatches exactly once, even when the fragment already held `fragment`.
    pub async fn navigate_to(&mut self, fragment: &str) -> &Screen {
        let session = self.ctx.current_user();
        let landing = self.navigator.settle(fragment, session.as_ref());
        self.land(landing).await
    }

    /// on_fragment_change
    ///
    /// A fragment edited by the user. Nothing is dispatched when the value did not
    /// change.
    pub async fn on_fragment_change(&mut self, fragment: &str) -> Option<&Screen> {
        if self.navigator.location().fragment() == fragment && self.screen.is_some() {
            tracing::debug!(fragment, "fragment unchanged");
            return None;
        }
        Some(self.navigate_to(fragment).await)
    }

    /// Routes the current fragment again.
    pub async fn reload(&mut self) -> &Screen {
        let fragment = self.navigator.location().fragment().to_string();
        self.navigate_to(&fragment).await
    }

    /// execute
    ///
    /// Runs a command and applies its outcome. A message from a command that stays
    /// on the screen replaces whatever message was shown; after a navigation it is
    /// only attached when the new screen has none of its own.
    pub async fn execute(&mut self, command: Command) -> &Screen {
        let outcome = actions::execute(&self.ctx, command).await;

        match outcome.next {
            Next::Navigate(fragment) => {
                self.navigate_to(&fragment).await;
                self.attach(outcome.message, false);
            }
            Next::Reload => {
                self.reload().await;
                self.attach(outcome.message, false);
            }
            Next::Stay => {
                if self.screen.is_none() {
                    self.reload().await;
                }
                self.attach(outcome.message, true);
            }
        }

        self.screen
            .get_or_insert_with(views::render_not_found)
    }

    fn attach(&mut self, message: Option<Message>, replace: bool) {
        let (Some(message), Some(screen)) = (message, self.screen.as_mut()) else {
            return;
        };
        if replace || screen.message.is_none() {
            screen.message = Some(message);
        }
    }

    /// Renders a landing, following redirects requested by the views themselves.
    /// A redirect that points back at the location already held never settles, so
    /// it renders the not-found screen.
    async fn land(&mut self, landing: Landing) -> &Screen {
        let Landing::View {
            mut view,
            mut param,
        } = landing
        else {
            tracing::warn!(fragment = %self.location(), "redirect loops on itself");
            return self.land_not_found();
        };

        for _ in 0..=MAX_REDIRECTS {
            self.generation += 1;
            self.dispatches += 1;
            let generation = self.generation;
            tracing::info!(?view, ?param, generation, "dispatch");

            match views::render(&self.ctx, view, param.as_deref()).await {
                ViewOutcome::Rendered(mut screen) => {
                    screen.generation = generation;
                    self.current = Some((view, param));
                    return self.screen.insert(screen);
                }
                ViewOutcome::Redirect(target) => {
                    tracing::debug!(from = ?view, to = %target, "view redirect");
                    let session = self.ctx.current_user();
                    match self.navigator.settle(&target, session.as_ref()) {
                        Landing::View {
                            view: next,
                            param: next_param,
                        } => {
                            view = next;
                            param = next_param;
                        }
                        Landing::Unchanged => {
                            tracing::warn!(?view, to = %target, "view redirect loops on itself");
                            return self.land_not_found();
                        }
                    }
                }
            }
        }

        tracing::warn!(?view, "view redirects did not settle");
        let mut screen = views::render_not_found();
        screen.generation = self.generation;
        self.current = Some((ViewId::NotFound, None));
        self.screen.insert(screen)
    }

    fn land_not_found(&mut self) -> &Screen {
        self.generation += 1;
        self.dispatches += 1;
        let generation = self.generation;
        tracing::info!(view = ?ViewId::NotFound, generation, "dispatch");

        let mut screen = views::render_not_found();
        screen.generation = generation;
        self.current = Some((ViewId::NotFound, None));
        self.screen.insert(screen)
    }
}
