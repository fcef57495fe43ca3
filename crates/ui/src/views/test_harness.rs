use std::sync::Arc;

use aarambh_core::model::{CourseId, Role, UserId, UserSession};
use aarambh_core::time::fixed_now;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::{AppServices, Clock, ServiceOptions};
use storage::local::MemoryStore;
use storage::repository::{RoleRepository, Storage};

use crate::context::{UiApp, build_app_context};
use crate::views::{
    AccountView, AdminView, CourseDetailView, CoursesView, HomeView, NotesView, ProgressView,
    QuizzesView, ResourcesView,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Courses,
    CourseDetail(CourseId),
    Quizzes,
    Progress,
    Notes,
    Resources,
    Admin,
    Account,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<dyn UiApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    use_context_provider(|| build_app_context(&props.app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Courses => rsx! { CoursesView {} },
        ViewKind::CourseDetail(course_id) => rsx! { CourseDetailView { course_id } },
        ViewKind::Quizzes => rsx! { QuizzesView {} },
        ViewKind::Progress => rsx! { ProgressView {} },
        ViewKind::Notes => rsx! { NotesView {} },
        ViewKind::Resources => rsx! { ResourcesView {} },
        ViewKind::Admin => rsx! { AdminView {} },
        ViewKind::Account => rsx! { AccountView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub services: AppServices,
}

impl ViewHarness {
    /// Sign in locally as a fresh user with `role`.
    pub async fn sign_in_as(&self, role: Role) -> UserSession {
        let user = UserId::random();
        self.storage
            .roles
            .set_role(user, role)
            .await
            .expect("set role");
        self.services.sessions().local(user).await.expect("local session")
    }

    /// Swap the rendered view, keeping storage and the signed-in session.
    pub fn show(&mut self, view: ViewKind) {
        let app: Arc<dyn UiApp> = Arc::new(self.services.clone());
        self.dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    }

    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// First render plus enough passes for every resource to resolve.
    pub async fn render_settled(&mut self) -> String {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    let storage = Storage::in_memory();
    let services = AppServices::new(
        Clock::fixed(fixed_now()),
        &storage,
        Arc::new(MemoryStore::new()),
        None,
        ServiceOptions::default(),
    );
    let app: Arc<dyn UiApp> = Arc::new(services.clone());
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness {
        dom,
        storage,
        services,
    }
}
