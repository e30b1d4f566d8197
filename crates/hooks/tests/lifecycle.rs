//! Black-box tests of the coupon hooks against in-memory stores.

use std::sync::Arc;

use chrono::Utc;

use coupon_core::{CouponId, CustomerId, HostVersion, OrderId, PreOrderId};
use coupon_discount::{
    Coupon, CouponCode, CouponNotice, CouponOrder, CouponOrderStore, CouponStore, Customer, Order,
    ReconcileOutcome, Shipping,
};
use coupon_hooks::hooks::COUPON_ORDER_KEY;
use coupon_hooks::{CouponConfig, CouponHooks, HookError, RestoreTrigger, ShoppingFragments, TemplateRender};
use coupon_infra::{InMemoryCouponOrderStore, InMemoryCouponStore, InMemoryOrderStore};
use coupon_markup::anchor::{COUPON_MARKER, FALLBACK_ANCHOR, SUMMARY_ANCHOR};

type Hooks = CouponHooks<
    Arc<InMemoryCouponOrderStore>,
    Arc<InMemoryCouponStore>,
    Arc<InMemoryOrderStore>,
>;

struct Harness {
    hooks: Hooks,
    coupon_orders: Arc<InMemoryCouponOrderStore>,
    coupons: Arc<InMemoryCouponStore>,
    orders: Arc<InMemoryOrderStore>,
    coupon: Coupon,
}

fn harness(host_version: HostVersion) -> Harness {
    coupon_observability::init();

    let coupon_orders = Arc::new(InMemoryCouponOrderStore::new());
    let coupons = Arc::new(InMemoryCouponStore::new());
    let orders = Arc::new(InMemoryOrderStore::new());
    let coupon = Coupon::new(CouponId::new(), CouponCode::new("WELCOME").unwrap(), 5);
    coupons.save(coupon.clone()).unwrap();

    let config = CouponConfig {
        host_version,
        ..CouponConfig::default()
    };

    Harness {
        hooks: CouponHooks::new(config, coupon_orders.clone(), coupons.clone(), orders.clone()),
        coupon_orders,
        coupons,
        orders,
        coupon,
    }
}

fn pre_order() -> PreOrderId {
    PreOrderId::new("cart-42").unwrap()
}

fn fragments() -> ShoppingFragments {
    ShoppingFragments {
        coupon_item: "<div class=\"coupon\">coupon</div>".to_string(),
        discount_row: "<dl class=\"discount\">-300</dl>".to_string(),
    }
}

fn attach(h: &Harness, customer: Customer, discount: i64) -> CouponOrder {
    let record = CouponOrder::new(&h.coupon, pre_order(), customer, discount, Utc::now()).unwrap();
    h.coupon_orders.save(record.clone()).unwrap();
    record
}

fn shopping_source() -> String {
    format!("<form>{SUMMARY_ANCHOR}<span>total</span></div>{COUPON_MARKER}{FALLBACK_ANCHOR}</form>")
}

#[test]
fn shopping_index_without_order_is_untouched() {
    let h = harness(HostVersion::default());
    let render = TemplateRender::new(shopping_source(), None);

    let out = h.hooks.on_render_shopping_index(render.clone(), &fragments()).unwrap();

    assert_eq!(out, render);
}

#[test]
fn shopping_index_inserts_coupon_block_and_exposes_coupon_order() {
    let h = harness(HostVersion::new(3, 0, 10));
    let record = attach(&h, Customer::guest("a@example.com"), 300);
    let order = Order::new(pre_order(), 1000, 0, 0, 300).unwrap();

    let out = h
        .hooks
        .on_render_shopping_index(TemplateRender::new(shopping_source(), Some(order.clone())), &fragments())
        .unwrap();

    assert!(out.source.contains(&format!("{}{COUPON_MARKER}", fragments().coupon_item)));
    assert!(!out.source.contains(&fragments().discount_row));
    assert_eq!(out.order, Some(order));
    assert_eq!(
        out.context.get(COUPON_ORDER_KEY),
        Some(&serde_json::to_value(&record).unwrap())
    );
    assert!(h.orders.get(&pre_order()).is_none(), "nothing persisted on modern hosts");
}

#[test]
fn shopping_index_without_coupon_exposes_null() {
    let h = harness(HostVersion::new(3, 0, 9));
    let order = Order::new(pre_order(), 1000, 0, 0, 0).unwrap();

    let out = h
        .hooks
        .on_render_shopping_index(TemplateRender::new(shopping_source(), Some(order.clone())), &fragments())
        .unwrap();

    assert_eq!(out.context.get(COUPON_ORDER_KEY), Some(&serde_json::Value::Null));
    assert_eq!(out.order, Some(order));
    assert!(!out.source.contains(&fragments().discount_row));
}

#[test]
fn legacy_host_folds_discount_into_total_and_persists_it() {
    let h = harness(HostVersion::new(3, 0, 9));
    attach(&h, Customer::guest("a@example.com"), 300);
    let order = Order::new(pre_order(), 1000, 0, 0, 0).unwrap();

    let out = h
        .hooks
        .on_render_shopping_index(TemplateRender::new(shopping_source(), Some(order)), &fragments())
        .unwrap();

    let adjusted = out.order.unwrap();
    assert_eq!(adjusted.total, 700);
    assert_eq!(adjusted.payment_total, 700);
    assert_eq!(h.orders.get(&pre_order()), Some(adjusted));
    assert!(out
        .source
        .contains(&format!("{SUMMARY_ANCHOR}{}", fragments().discount_row)));
}

#[test]
fn confirm_init_blocks_coupon_used_by_someone_else() {
    let h = harness(HostVersion::default());
    let mut record = attach(&h, Customer::member(CustomerId::new()), 300);
    record.finalize(Utc::now());
    h.coupon_orders.save(record).unwrap();

    let err = h
        .hooks
        .on_shopping_confirm_init(Some(&pre_order()), &Customer::guest("other@example.com"))
        .unwrap_err();

    assert_eq!(err.redirect(), Some("shopping"));
    match err {
        HookError::UsageConflict { message_key, .. } => {
            assert_eq!(message_key, CouponNotice::AlreadyUsed.message_key());
        }
        other => panic!("Expected UsageConflict, got {other:?}"),
    }
}

#[test]
fn confirm_init_without_coupon_passes() {
    let h = harness(HostVersion::default());
    let customer = Customer::guest("a@example.com");

    assert!(h.hooks.on_shopping_confirm_init(None, &customer).is_ok());
    assert!(h.hooks.on_shopping_confirm_init(Some(&pre_order()), &customer).is_ok());

    attach(&h, customer.clone(), 300);
    assert!(h.hooks.on_shopping_confirm_init(Some(&pre_order()), &customer).is_ok());
}

#[test]
fn completion_consumes_coupon_once() {
    let h = harness(HostVersion::default());
    let completed = Order::new(pre_order(), 1000, 0, 0, 300)
        .unwrap()
        .with_order_id(OrderId::new());
    let order_id = completed.order_id.unwrap();
    let mut record = attach(&h, Customer::guest("a@example.com"), 300);
    record.attach_order(order_id, Utc::now());
    h.coupon_orders.save(record).unwrap();

    let first = h.hooks.on_render_shopping_complete(completed.order_id, Utc::now()).unwrap();
    let second = h.hooks.on_render_shopping_complete(completed.order_id, Utc::now()).unwrap();

    assert_eq!(first, ReconcileOutcome::Finalized);
    assert_eq!(second, ReconcileOutcome::FinalizeSkipped);
    let coupon = h.coupons.find(h.coupon.coupon_id()).unwrap().unwrap();
    assert_eq!(coupon.remaining_uses(), 4);
}

#[test]
fn completion_without_order_or_coupon_is_a_no_op() {
    let h = harness(HostVersion::default());

    assert_eq!(
        h.hooks.on_render_shopping_complete(None, Utc::now()).unwrap(),
        ReconcileOutcome::NoOp
    );
    assert_eq!(
        h.hooks.on_render_shopping_complete(Some(OrderId::new()), Utc::now()).unwrap(),
        ReconcileOutcome::NoOp
    );
}

fn admin_page() -> String {
    "<!DOCTYPE html><html><head><title>edit</title></head><body>\
     <div class=\"col-md-12\"><div class=\"box\">order</div>\
     <div class=\"row btn_area\"><button>save</button></div></div>\
     </body></html>"
        .to_string()
}

fn finalized_order(h: &Harness) -> OrderId {
    let order_id = OrderId::new();
    let mut record = attach(h, Customer::guest("a@example.com"), 300);
    record.attach_order(order_id, Utc::now());
    record.finalize(Utc::now());
    h.coupon_orders.save(record).unwrap();
    order_id
}

#[test]
fn admin_order_edit_shows_used_coupon() {
    let h = harness(HostVersion::default());
    let order_id = finalized_order(&h);

    let html = h
        .hooks
        .on_admin_order_edit_init(Some(&order_id.to_string()), admin_page(), |coupon, record| {
            format!(
                "<div class=\"coupon-panel\">{} / {}</div>",
                coupon.coupon_code(),
                record.discount()
            )
        })
        .unwrap();

    let panel = html.find("coupon-panel").unwrap();
    assert!(html.find("order").unwrap() < panel);
    assert!(panel < html.find("row btn_area").unwrap());
    assert!(html.contains("WELCOME / 300"));
}

#[test]
fn admin_order_edit_leaves_page_alone_when_nothing_to_show() {
    let h = harness(HostVersion::default());
    let page = admin_page();
    let never = |_: &Coupon, _: &CouponOrder| -> String { panic!("fragment must not be rendered") };

    assert_eq!(h.hooks.on_admin_order_edit_init(None, page.clone(), never).unwrap(), page);
    assert_eq!(
        h.hooks.on_admin_order_edit_init(Some("not-a-uuid"), page.clone(), never).unwrap(),
        page
    );
    assert_eq!(
        h.hooks
            .on_admin_order_edit_init(Some(&OrderId::new().to_string()), page.clone(), never)
            .unwrap(),
        page
    );
}

#[test]
fn admin_order_edit_on_legacy_layout_needs_legacy_anchors() {
    let h = harness(HostVersion::new(3, 0, 4));
    let order_id = finalized_order(&h);
    let page = admin_page();

    let html = h
        .hooks
        .on_admin_order_edit_init(Some(&order_id.to_string()), page.clone(), |_, _| {
            "<div class=\"coupon-panel\"></div>".to_string()
        })
        .unwrap();

    assert_eq!(html, page);
}

#[test]
fn admin_order_edit_with_strict_parsing_keeps_malformed_page() {
    let h = harness(HostVersion::default());
    let order_id = finalized_order(&h);
    let strict = CouponHooks::new(
        CouponConfig {
            tolerant_parse: false,
            ..CouponConfig::default()
        },
        h.coupon_orders.clone(),
        h.coupons.clone(),
        h.orders.clone(),
    );
    let page = "<div class=\"col-md-12\"><p>unclosed</span>\
                <div class=\"row btn_area\">save</div></div>"
        .to_string();

    let html = strict
        .on_admin_order_edit_init(Some(&order_id.to_string()), page.clone(), |_, _| {
            "<div class=\"coupon-panel\"></div>".to_string()
        })
        .unwrap();

    assert_eq!(html, page);
}

#[test]
fn restore_from_shipping_change_rolls_back_and_persists() {
    let h = harness(HostVersion::default());
    attach(&h, Customer::guest("a@example.com"), 1500);
    let order = Order::new(pre_order(), 1000, 0, 0, 1500).unwrap();

    let result = h
        .hooks
        .on_restore_discount(RestoreTrigger::Shipping(Shipping::new(order)))
        .unwrap();

    assert!(result.rolled_back());
    assert_eq!(result.notice, Some(CouponNotice::NegativeTotal));
    let saved = h.orders.get(&pre_order()).unwrap();
    assert_eq!((saved.discount, saved.total, saved.payment_total), (0, 1000, 1000));
    assert!(h.coupon_orders.find_by_pre_order_id(&pre_order()).unwrap().is_none());
}

#[test]
fn restore_with_positive_total_persists_nothing() {
    let h = harness(HostVersion::default());
    attach(&h, Customer::guest("a@example.com"), 500);
    let order = Order::new(pre_order(), 1000, 0, 0, 500).unwrap();

    let result = h.hooks.on_restore_discount(RestoreTrigger::Order(order.clone())).unwrap();

    assert!(!result.rolled_back());
    assert_eq!(result.order, order);
    assert!(h.orders.get(&pre_order()).is_none());
    assert_eq!(h.coupon_orders.len(), 1);
}
