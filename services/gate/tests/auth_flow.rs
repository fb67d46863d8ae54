use gate::app::{build_router, AppState};
use gate::config::GateConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use wicket_auth::{now_epoch_seconds, Principal, PrincipalSet, SecretKey, Ticket};

// sha256("super") and sha256("user").
const SUPER_HASH: &str = "73d1b1b1bc1dabfb97f216d897b7968e44b06457920f00f2dc6c1ed3be25ad4c";
const USER_HASH: &str = "04f8996da763b7a969b1028ee3007569eaf3a635486ddab211d512c85b9df8fb";

const TEST_KEY: &[u8; 16] = b"YELLOW SUBMARINE";

fn fixture_config() -> GateConfig {
    GateConfig {
        secret_key: SecretKey::from_bytes(*TEST_KEY),
        expire_secs: 3600,
        port: 0,
        principals: PrincipalSet::new(vec![
            Principal {
                name: "superuser".to_string(),
                hash: SUPER_HASH.to_string(),
                resources: vec!["ALL".to_string()],
            },
            Principal {
                name: "private-x".to_string(),
                hash: USER_HASH.to_string(),
                resources: vec!["/private/x.html".to_string()],
            },
        ]),
    }
}

async fn spawn_gate() -> SocketAddr {
    let router = build_router(AppState {
        config: Arc::new(fixture_config()),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router.into_make_service()).await;
    });
    addr
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build test client")
}

fn mint_token(principal: &str, expiry: i64) -> String {
    Ticket::new(principal, expiry)
        .to_token(&SecretKey::from_bytes(*TEST_KEY))
        .expect("token")
}

async fn check_auth(addr: SocketAddr, cookie: Option<&str>, resource: Option<&str>) -> u16 {
    let mut request = client().get(format!("http://{addr}/_auth"));
    if let Some(cookie) = cookie {
        request = request.header("cookie", format!("ticket={cookie}"));
    }
    if let Some(resource) = resource {
        request = request.header("x-original-uri", resource);
    }
    request.send().await.expect("request").status().as_u16()
}

#[tokio::test]
async fn no_cookie_is_unauthorized() {
    let addr = spawn_gate().await;
    assert_eq!(check_auth(addr, None, None).await, 401);
}

#[tokio::test]
async fn expired_ticket_is_unauthorized() {
    let addr = spawn_gate().await;
    let token = mint_token("superuser", now_epoch_seconds() - 3600);
    assert_eq!(
        check_auth(addr, Some(&token), Some("/private/x.html")).await,
        401
    );
}

#[tokio::test]
async fn valid_ticket_reaches_an_allowed_resource() {
    let addr = spawn_gate().await;
    let token = mint_token("superuser", now_epoch_seconds() + 3600);
    assert_eq!(
        check_auth(addr, Some(&token), Some("/private/x.html")).await,
        200
    );
}

#[tokio::test]
async fn prefix_principal_is_held_to_its_prefix() {
    let addr = spawn_gate().await;
    let token = mint_token("private-x", now_epoch_seconds() + 3600);
    assert_eq!(
        check_auth(addr, Some(&token), Some("/private/x.html")).await,
        200
    );
    assert_eq!(
        check_auth(addr, Some(&token), Some("/private/x.htmlfoo")).await,
        200
    );
    assert_eq!(
        check_auth(addr, Some(&token), Some("/private/x.htm")).await,
        401
    );
    assert_eq!(
        check_auth(addr, Some(&token), Some("/public/x.html")).await,
        401
    );
    assert_eq!(check_auth(addr, Some(&token), None).await, 401);
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let addr = spawn_gate().await;
    let mut token = mint_token("superuser", now_epoch_seconds() + 3600);
    token.push('x');
    assert_eq!(check_auth(addr, Some(&token), Some("/")).await, 401);
}

#[tokio::test]
async fn unknown_principal_in_a_genuine_ticket_is_unauthorized() {
    // Sealed under the right key but naming nobody in the table.
    let addr = spawn_gate().await;
    let token = mint_token("stranger", now_epoch_seconds() + 3600);
    assert_eq!(
        check_auth(addr, Some(&token), Some("/private/x.html")).await,
        401
    );
}

#[tokio::test]
async fn csrf_ticket_never_authorizes_a_resource() {
    let addr = spawn_gate().await;
    let token = Ticket::csrf(now_epoch_seconds())
        .to_token(&SecretKey::from_bytes(*TEST_KEY))
        .expect("token");
    assert_eq!(
        check_auth(addr, Some(&token), Some("/private/x.html")).await,
        401
    );
}

fn extract_csrf(body: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = body.find(marker).expect("csrf field") + marker.len();
    let end = body[start..].find('"').expect("closing quote") + start;
    body[start..end].to_string()
}

fn set_cookie_token(response: &reqwest::Response) -> Option<String> {
    let raw = response
        .headers()
        .get(reqwest::header::SET_COOKIE)?
        .to_str()
        .ok()?;
    raw.split(';')
        .next()?
        .strip_prefix("ticket=")
        .map(str::to_string)
}

async fn fetch_csrf(addr: SocketAddr) -> String {
    let response = client()
        .get(format!("http://{addr}/login"))
        .send()
        .await
        .expect("login page");
    assert_eq!(response.status().as_u16(), 200);
    extract_csrf(&response.text().await.expect("body"))
}

async fn submit_login(
    addr: SocketAddr,
    username: &str,
    password: &str,
    csrf_token: &str,
    redirect_cookie: Option<&str>,
) -> reqwest::Response {
    let mut request = client().post(format!("http://{addr}/login")).form(&[
        ("username", username),
        ("password", password),
        ("csrf_token", csrf_token),
    ]);
    if let Some(target) = redirect_cookie {
        request = request.header("cookie", format!("gate_redirect={target}"));
    }
    request.send().await.expect("login submit")
}

#[tokio::test]
async fn login_flow_issues_a_working_ticket() {
    let addr = spawn_gate().await;
    let csrf = fetch_csrf(addr).await;

    let response = submit_login(addr, "superuser", "super", &csrf, None).await;
    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/")
    );
    let token = set_cookie_token(&response).expect("ticket cookie");

    assert_eq!(
        check_auth(addr, Some(&token), Some("/private/x.html")).await,
        200
    );
}

#[tokio::test]
async fn login_honors_the_redirect_cookie() {
    let addr = spawn_gate().await;
    let csrf = fetch_csrf(addr).await;
    let response =
        submit_login(addr, "superuser", "super", &csrf, Some("/private/x.html")).await;
    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/private/x.html")
    );
}

#[tokio::test]
async fn wrong_password_sets_no_cookie() {
    let addr = spawn_gate().await;
    let csrf = fetch_csrf(addr).await;
    let response = submit_login(addr, "superuser", "wrong", &csrf, None).await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(set_cookie_token(&response).is_none());
}

#[tokio::test]
async fn garbage_csrf_token_sets_no_cookie() {
    let addr = spawn_gate().await;
    let response = submit_login(addr, "superuser", "super", "garbage", None).await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(set_cookie_token(&response).is_none());
}

#[tokio::test]
async fn principal_ticket_does_not_pass_as_a_csrf_token() {
    // A valid login ticket is not minted under the reserved name, so it
    // cannot stand in for the anti-forgery token.
    let addr = spawn_gate().await;
    let stolen = mint_token("superuser", now_epoch_seconds() + 3600);
    let response = submit_login(addr, "superuser", "super", &stolen, None).await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(set_cookie_token(&response).is_none());
}
