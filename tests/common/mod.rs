#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use cinema_api::AppError;
use cinema_api::application::services::auth_service::{DEFAULT_TOKEN_TTL, hash_token};
use cinema_api::api::middleware::timeout::DEFAULT_REQUEST_TIMEOUT;
use cinema_api::domain::entities::{
    IssuedToken, Movie, NewMovie, NewToken, NewUser, Permissions, Runtime, TokenScope, User,
    UserCredentials,
};
use cinema_api::domain::mailer::Mailer;
use cinema_api::domain::repositories::{
    MovieFilter, MovieRepository, PermissionRepository, SortColumn, TokenRepository,
    UserRepository,
};
use cinema_api::infrastructure::rate_limit::{RateLimitSettings, RateLimiter};
use cinema_api::routes::app_router;
use cinema_api::state::{AppState, Stores};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::Layer;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const PASSWORD: &str = "pa55word";

#[derive(Clone)]
struct StoredToken {
    user_id: i64,
    expiry: DateTime<Utc>,
    scope: TokenScope,
}

#[derive(Default)]
struct Tables {
    movies: HashMap<i64, Movie>,
    next_movie_id: i64,
    users: HashMap<i64, UserCredentials>,
    next_user_id: i64,
    tokens: HashMap<String, StoredToken>,
    permissions: HashMap<i64, Vec<String>>,
}

/// In-memory implementation of every store the router needs.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    /// Number of token resolutions that reached the store.
    pub token_lookups: AtomicUsize,
    /// Makes every permission lookup fail.
    pub fail_permissions: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn token_lookups(&self) -> usize {
        self.token_lookups.load(Ordering::SeqCst)
    }

    pub fn stored_version(&self, id: i64) -> Option<i32> {
        self.tables.lock().unwrap().movies.get(&id).map(|m| m.version)
    }

    pub fn movie_count(&self) -> usize {
        self.tables.lock().unwrap().movies.len()
    }

    pub fn find_user(&self, id: i64) -> Option<User> {
        self.tables.lock().unwrap().users.get(&id).map(|c| c.user.clone())
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let t = self.tables.lock().unwrap();
        t.users
            .values()
            .find(|c| c.user.email == email)
            .map(|c| c.user.clone())
    }

    /// Permission codes granted to `user_id`.
    pub fn granted(&self, user_id: i64) -> Vec<String> {
        let t = self.tables.lock().unwrap();
        t.permissions.get(&user_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl MovieRepository for InMemoryStore {
    async fn insert(&self, new_movie: NewMovie) -> Result<Movie, AppError> {
        let mut t = self.tables.lock().unwrap();
        t.next_movie_id += 1;
        let movie = Movie {
            id: t.next_movie_id,
            created_at: Utc::now(),
            title: new_movie.title,
            year: new_movie.year,
            runtime: new_movie.runtime,
            genres: new_movie.genres,
            version: 1,
        };
        t.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn get(&self, id: i64) -> Result<Option<Movie>, AppError> {
        Ok(self.tables.lock().unwrap().movies.get(&id).cloned())
    }

    async fn list(&self, filter: &MovieFilter) -> Result<(Vec<Movie>, i64), AppError> {
        let t = self.tables.lock().unwrap();
        let title = filter.title.to_lowercase();

        let mut matched: Vec<Movie> = t
            .movies
            .values()
            .filter(|m| title.is_empty() || m.title.to_lowercase().contains(&title))
            .filter(|m| filter.genres.iter().all(|g| m.genres.contains(g)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ord = match filter.sort.column {
                SortColumn::Id => a.id.cmp(&b.id),
                SortColumn::Title => a.title.cmp(&b.title),
                SortColumn::Year => a.year.cmp(&b.year),
                SortColumn::Runtime => a.runtime.0.cmp(&b.runtime.0),
            };
            let ord = if filter.sort.descending { ord.reverse() } else { ord };
            ord.then(a.id.cmp(&b.id))
        });

        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn update(&self, movie: &Movie) -> Result<Option<i32>, AppError> {
        let mut t = self.tables.lock().unwrap();
        match t.movies.get_mut(&movie.id) {
            Some(stored) if stored.version == movie.version => {
                *stored = movie.clone();
                stored.version += 1;
                Ok(Some(stored.version))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.lock().unwrap().movies.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.values().any(|c| c.user.email == new_user.email) {
            return Err(AppError::conflict("duplicate email", serde_json::json!({})));
        }
        t.next_user_id += 1;
        let user = User {
            id: t.next_user_id,
            created_at: Utc::now(),
            name: new_user.name,
            email: new_user.email,
            activated: new_user.activated,
        };
        t.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.values().find(|c| c.user.email == email).cloned())
    }

    async fn find_for_token(
        &self,
        scope: TokenScope,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);
        let t = self.tables.lock().unwrap();
        Ok(t.tokens
            .get(token_hash)
            .filter(|tok| tok.scope == scope && tok.expiry > now)
            .and_then(|tok| t.users.get(&tok.user_id))
            .map(|c| c.user.clone()))
    }

    async fn activate(&self, user_id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.users
            .get_mut(&user_id)
            .map(|c| c.user.activated = true)
            .is_some())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut users: Vec<User> = t.users.values().map(|c| c.user.clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn insert(&self, token: NewToken) -> Result<(), AppError> {
        self.tables.lock().unwrap().tokens.insert(
            token.hash,
            StoredToken {
                user_id: token.user_id,
                expiry: token.expiry,
                scope: token.scope,
            },
        );
        Ok(())
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.tokens.len();
        t.tokens
            .retain(|_, tok| !(tok.scope == scope && tok.user_id == user_id));
        Ok((before - t.tokens.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.tokens.len();
        t.tokens.retain(|_, tok| tok.expiry > now);
        Ok((before - t.tokens.len()) as u64)
    }
}

#[async_trait]
impl PermissionRepository for InMemoryStore {
    async fn get_all_for_user(&self, user_id: i64) -> Result<Permissions, AppError> {
        if self.fail_permissions.load(Ordering::SeqCst) {
            return Err(AppError::internal("permission store unavailable"));
        }
        let t = self.tables.lock().unwrap();
        Ok(Permissions::from(
            t.permissions.get(&user_id).cloned().unwrap_or_default(),
        ))
    }

    async fn add_for_user(&self, user_id: i64, codes: &[String]) -> Result<(), AppError> {
        let mut t = self.tables.lock().unwrap();
        let granted = t.permissions.entry(user_id).or_default();
        for code in codes {
            if !granted.contains(code) {
                granted.push(code.clone());
            }
        }
        Ok(())
    }
}

/// Mailer that keeps every activation it was asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Waits for the background send and returns the plaintext token mailed to `email`.
    pub async fn activation_token_for(&self, email: &str) -> String {
        for _ in 0..100 {
            let found = self
                .sent
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, token)| token.clone());
            if let Some(token) = found {
                return token;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("no activation email sent to {email}");
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_activation(&self, recipient: &User, token: &IssuedToken) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.email.clone(), token.plaintext.clone()));
        Ok(())
    }
}

pub fn create_test_state(store: &Arc<InMemoryStore>) -> AppState {
    create_test_state_with_mailer(store, RecordingMailer::new())
}

pub fn create_test_state_with_mailer(
    store: &Arc<InMemoryStore>,
    mailer: Arc<RecordingMailer>,
) -> AppState {
    AppState::new(
        Stores {
            movies: store.clone(),
            users: store.clone(),
            tokens: store.clone(),
            permissions: store.clone(),
            mailer,
        },
        SIGNING_SECRET.to_string(),
        DEFAULT_TOKEN_TTL,
        "testing",
    )
}

/// Inserts `ConnectInfo` for a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer(pub SocketAddr);

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.0,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}

pub fn peer() -> SocketAddr {
    "127.0.0.1:12345".parse().unwrap()
}

/// Full application router with rate limiting disabled.
pub fn create_test_app(store: &Arc<InMemoryStore>) -> Router {
    app_router(create_test_state(store), None, &[], DEFAULT_REQUEST_TIMEOUT)
}

pub fn create_test_server(store: &Arc<InMemoryStore>) -> TestServer {
    TestServer::new(create_test_app(store).layer(MockConnectInfoLayer(peer()))).unwrap()
}

/// Test server whose registrations are captured by `mailer`.
pub fn create_test_server_with_mailer(
    store: &Arc<InMemoryStore>,
    mailer: Arc<RecordingMailer>,
) -> TestServer {
    let app = app_router(
        create_test_state_with_mailer(store, mailer),
        None,
        &[],
        DEFAULT_REQUEST_TIMEOUT,
    );
    TestServer::new(app.layer(MockConnectInfoLayer(peer()))).unwrap()
}

pub fn create_rate_limited_app(store: &Arc<InMemoryStore>, settings: RateLimitSettings) -> Router {
    let limiter = Arc::new(RateLimiter::new(settings).unwrap());
    app_router(
        create_test_state(store),
        Some(limiter),
        &[],
        DEFAULT_REQUEST_TIMEOUT,
    )
}

/// Creates a user and returns it. The password is always [`PASSWORD`].
pub async fn create_test_user(
    store: &Arc<InMemoryStore>,
    email: &str,
    activated: bool,
    permissions: &[&str],
) -> User {
    let password_hash = cinema_api::utils::password::hash_password(PASSWORD).unwrap();
    let user = UserRepository::insert(
        store.as_ref(),
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash,
            activated,
        },
    )
    .await
    .unwrap();

    let codes: Vec<String> = permissions.iter().map(|c| c.to_string()).collect();
    store.add_for_user(user.id, &codes).await.unwrap();

    user
}

/// Stores a token for `user_id` that expires at `expiry` and returns its plaintext.
pub async fn create_test_token(
    store: &Arc<InMemoryStore>,
    user_id: i64,
    plaintext: &str,
    expiry: DateTime<Utc>,
) -> String {
    TokenRepository::insert(
        store.as_ref(),
        NewToken {
            hash: hash_token(SIGNING_SECRET, plaintext).unwrap(),
            user_id,
            expiry,
            scope: TokenScope::Authentication,
        },
    )
    .await
    .unwrap();

    plaintext.to_string()
}

/// Creates a user with the given state and a valid token for it.
pub async fn create_authenticated_user(
    store: &Arc<InMemoryStore>,
    email: &str,
    activated: bool,
    permissions: &[&str],
) -> (User, String) {
    let user = create_test_user(store, email, activated, permissions).await;
    let token = cinema_api::utils::token_generator::generate_token().unwrap();
    let token = create_test_token(store, user.id, &token, Utc::now() + DEFAULT_TOKEN_TTL).await;
    (user, token)
}

pub async fn create_test_movie(store: &Arc<InMemoryStore>, title: &str, year: i32) -> Movie {
    MovieRepository::insert(
        store.as_ref(),
        NewMovie {
            title: title.to_string(),
            year,
            runtime: Runtime(102),
            genres: vec!["drama".to_string()],
        },
    )
    .await
    .unwrap()
}
