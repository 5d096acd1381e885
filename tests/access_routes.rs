//! Route resolution for the users in the default fixture set.

use testresult::TestResult;
use tiller::{
    access::{
        DenialReason, Feature, Plan, Requirement,
        routes::{LOGIN_PATH, Navigation, Route, resolve},
    },
    fixtures::Fixture,
    session::{ProfileUpdate, Session},
};

fn outcome(navigation: &Navigation) -> Option<DenialReason> {
    match navigation {
        Navigation::Denied(_, denial) => Some(denial.reason()),
        Navigation::Render(_) | Navigation::Redirect(_) => None,
    }
}

fn fixture() -> Result<Fixture<'static>, tiller::fixtures::FixtureError> {
    let mut fixture = Fixture::new();

    fixture.load_users("default")?;

    Ok(fixture)
}

#[test]
fn admin_reaches_everything_but_inventory() -> TestResult {
    let fixture = fixture()?;
    let admin = fixture.user("admin")?;

    for route in Route::ALL {
        let navigation = resolve(route.path(), Some(admin));

        if route == Route::Inventory {
            assert_eq!(outcome(&navigation), Some(DenialReason::Permission), "{route}");
        } else {
            assert_eq!(navigation, Navigation::Render(route), "{route}");
        }
    }

    Ok(())
}

#[test]
fn seller_is_kept_out_of_management_views() -> TestResult {
    let fixture = fixture()?;
    let seller = fixture.user("vendedor")?;

    assert_eq!(resolve("/ventas", Some(seller)), Navigation::Render(Route::Sales));
    assert_eq!(
        outcome(&resolve("/reportes", Some(seller))),
        Some(DenialReason::Role)
    );
    assert_eq!(
        outcome(&resolve("/configuracion", Some(seller))),
        Some(DenialReason::Role)
    );
    assert_eq!(
        outcome(&resolve("/inventario", Some(seller))),
        Some(DenialReason::Permission)
    );

    Ok(())
}

#[test]
fn accountant_and_stock_keeper_see_their_views() -> TestResult {
    let fixture = fixture()?;
    let accountant = fixture.user("contador")?;
    let keeper = fixture.user("deposito")?;

    assert_eq!(resolve("/reportes", Some(accountant)), Navigation::Render(Route::Reports));
    assert_eq!(resolve("/inventario", Some(keeper)), Navigation::Render(Route::Inventory));
    assert_eq!(
        outcome(&resolve("/reportes", Some(keeper))),
        Some(DenialReason::Role)
    );

    Ok(())
}

#[test]
fn visitors_are_sent_to_sign_in() {
    for route in Route::ALL {
        assert_eq!(
            resolve(route.path(), None),
            Navigation::Redirect(LOGIN_PATH),
            "{route}"
        );
    }
}

#[test]
fn plan_upgrade_unlocks_mercado_pago() -> TestResult {
    let fixture = fixture()?;
    let mut session = Session::new();
    let requirement = Requirement::feature(Feature::Mercadopago);

    session.sign_in(fixture.user("vendedor")?.clone());

    let denial = session.evaluate(&requirement);

    assert_eq!(denial.denial().map(|d| d.reason()), Some(DenialReason::Plan));

    session.update_profile(ProfileUpdate {
        plan: Some(Plan::Comercios),
        ..ProfileUpdate::default()
    })?;

    assert!(session.evaluate(&requirement).is_allowed());

    session.sign_out();

    assert_eq!(
        session.evaluate(&requirement).denial().map(|d| d.reason()),
        Some(DenialReason::Unauthenticated)
    );

    Ok(())
}
