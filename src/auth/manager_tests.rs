//! Unit tests for credential caching in the token lifecycle manager.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use rstest::{fixture, rstest};
use secrecy::SecretString;

use super::TokenLifecycleManager;
use crate::auth::assertion::{AppAssertionSigner, AppClaims};
use crate::auth::clock::{Clock, ManualClock};
use crate::auth::credential::Credential;
use crate::auth::exchange::TokenExchange;
use crate::github::error::ReviewError;
use crate::github::locator::InstallationId;

const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/test_app_key.pem");
const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/test_app_key.pub.pem");
const START: i64 = 1_700_000_000;
const TOKEN_LIFETIME: i64 = 3_600;

/// Exchange stub that counts calls and records the assertions it receives.
#[derive(Debug)]
struct StubExchange {
    clock: ManualClock,
    calls: Arc<AtomicUsize>,
    assertions: Arc<Mutex<Vec<String>>>,
    failure: Option<ReviewError>,
}

impl TokenExchange for StubExchange {
    fn exchange(
        &self,
        installation_id: InstallationId,
        assertion: &str,
    ) -> Result<Credential, ReviewError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.assertions
            .lock()
            .expect("assertions mutex should be available")
            .push(assertion.to_owned());

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        Ok(Credential::new(
            format!("ghs_{}_{call}", installation_id.get()),
            self.clock.now() + TOKEN_LIFETIME,
        ))
    }
}

struct ManagerFixture {
    clock: ManualClock,
    calls: Arc<AtomicUsize>,
    assertions: Arc<Mutex<Vec<String>>>,
    manager: TokenLifecycleManager<StubExchange, ManualClock>,
}

impl ManagerFixture {
    fn exchange_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_assertion(&self) -> String {
        self.assertions
            .lock()
            .expect("assertions mutex should be available")
            .last()
            .cloned()
            .expect("an assertion should have been exchanged")
    }
}

fn build_fixture(failure: Option<ReviewError>) -> ManagerFixture {
    let clock = ManualClock::new(START);
    let calls = Arc::new(AtomicUsize::new(0));
    let assertions = Arc::new(Mutex::new(Vec::new()));
    let signer = AppAssertionSigner::from_pem("4242", &SecretString::from(PRIVATE_KEY.to_owned()))
        .expect("test key should parse");
    let exchange = StubExchange {
        clock: clock.clone(),
        calls: Arc::clone(&calls),
        assertions: Arc::clone(&assertions),
        failure,
    };

    ManagerFixture {
        clock: clock.clone(),
        calls,
        assertions,
        manager: TokenLifecycleManager::new(signer, exchange, clock),
    }
}

#[fixture]
fn fixture() -> ManagerFixture {
    build_fixture(None)
}

fn installation(value: u64) -> InstallationId {
    InstallationId::new(value).expect("installation id")
}

fn claims(token: &str) -> AppClaims {
    let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).expect("public key");
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    jsonwebtoken::decode::<AppClaims>(token, &key, &validation)
        .expect("assertion should verify")
        .claims
}

#[rstest]
fn installation_token_is_reused_within_validity(mut fixture: ManagerFixture) {
    let first = fixture
        .manager
        .installation_token(installation(7))
        .expect("first call should mint");
    fixture.clock.advance(TOKEN_LIFETIME - 61);
    let second = fixture
        .manager
        .installation_token(installation(7))
        .expect("second call should reuse");

    assert_eq!(first, second);
    assert_eq!(fixture.exchange_calls(), 1, "no extra exchange expected");
}

#[rstest]
fn installation_token_is_refreshed_inside_margin(mut fixture: ManagerFixture) {
    let first = fixture
        .manager
        .installation_token(installation(7))
        .expect("first call should mint");
    fixture.clock.advance(TOKEN_LIFETIME - 60);
    let second = fixture
        .manager
        .installation_token(installation(7))
        .expect("refresh should mint");
    let third = fixture
        .manager
        .installation_token(installation(7))
        .expect("third call should reuse the refreshed token");

    assert_ne!(first, second);
    assert_eq!(second, third);
    assert_eq!(fixture.exchange_calls(), 2, "exactly one refresh expected");
}

#[rstest]
fn exchange_uses_signed_assertion(mut fixture: ManagerFixture) {
    fixture
        .manager
        .installation_token(installation(7))
        .expect("call should mint");

    let exchanged = claims(&fixture.last_assertion());

    assert_eq!(
        exchanged,
        AppClaims {
            iat: START,
            exp: START + 600,
            iss: "4242".to_owned(),
        }
    );
}

#[rstest]
fn switching_installation_replaces_cached_token(mut fixture: ManagerFixture) {
    let first = fixture
        .manager
        .installation_token(installation(7))
        .expect("first installation");
    let second = fixture
        .manager
        .installation_token(installation(8))
        .expect("second installation");

    assert_eq!(first, "ghs_7_1");
    assert_eq!(second, "ghs_8_2");
    assert_eq!(fixture.exchange_calls(), 2);
}

#[rstest]
fn assertion_is_cached_until_refresh_margin(mut fixture: ManagerFixture) {
    let first = fixture.manager.create_assertion().expect("sign");
    fixture.clock.advance(539);
    let cached = fixture.manager.create_assertion().expect("reuse");
    fixture.clock.advance(1);
    let refreshed = fixture.manager.create_assertion().expect("re-sign");

    assert_eq!(first, cached);
    assert_eq!(claims(&cached).iat, START);
    assert_eq!(claims(&refreshed).iat, START + 540);
}

#[rstest]
fn refreshed_installation_token_reuses_cached_assertion(mut fixture: ManagerFixture) {
    fixture
        .manager
        .installation_token(installation(7))
        .expect("first installation");
    let first_assertion = fixture.last_assertion();
    fixture
        .manager
        .installation_token(installation(8))
        .expect("second installation");

    assert_eq!(fixture.last_assertion(), first_assertion);
}

#[test]
fn exchange_failure_propagates_without_caching() {
    let failure = ReviewError::AuthExchangeFailed {
        status: 401,
        body: "Bad credentials".to_owned(),
    };
    let mut failing = build_fixture(Some(failure.clone()));

    let first = failing.manager.installation_token(installation(7));
    let second = failing.manager.installation_token(installation(7));

    assert_eq!(first, Err(failure.clone()));
    assert_eq!(second, Err(failure));
    assert_eq!(
        failing.exchange_calls(),
        2,
        "a failed exchange must not be cached"
    );
}
