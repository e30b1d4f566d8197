//! Hook adapters invoked by the host at checkout and admin lifecycle points.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};

use coupon_core::{OrderId, PreOrderId};
use coupon_discount::{
    Coupon, CouponOrder, CouponOrderStore, CouponStore, Customer, DiscountEngine, Order,
    OrderStore, ReconcileOutcome, Reconciled, Shipping,
};
use coupon_markup::anchor::{self, SUMMARY_ANCHOR};
use coupon_markup::{AnchorPatcher, DomPatcher};

use crate::config::CouponConfig;
use crate::error::HookError;

/// Render-context key under which the resolved coupon order is exposed.
pub const COUPON_ORDER_KEY: &str = "CouponOrder";

/// Template source about to be rendered, plus its parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateRender {
    pub source: String,
    pub order: Option<Order>,
    pub context: Map<String, JsonValue>,
}

impl TemplateRender {
    pub fn new(source: impl Into<String>, order: Option<Order>) -> Self {
        Self {
            source: source.into(),
            order,
            context: Map::new(),
        }
    }
}

/// Template snippets shipped with the coupon layer for the shopping page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingFragments {
    /// Coupon entry/summary block.
    pub coupon_item: String,
    /// Discount row for the order summary, used when the host cannot show one.
    pub discount_row: String,
}

/// Argument of a delivery/payment change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTrigger {
    Order(Order),
    Shipping(Shipping),
}

impl RestoreTrigger {
    pub fn into_order(self) -> Order {
        match self {
            RestoreTrigger::Order(order) => order,
            RestoreTrigger::Shipping(shipping) => shipping.into_order(),
        }
    }
}

pub struct CouponHooks<O, C, R> {
    config: CouponConfig,
    engine: DiscountEngine<O, C>,
    orders: R,
    anchors: AnchorPatcher,
    dom: DomPatcher,
}

impl<O, C, R> CouponHooks<O, C, R>
where
    O: CouponOrderStore,
    C: CouponStore,
    R: OrderStore,
{
    pub fn new(config: CouponConfig, coupon_orders: O, coupons: C, orders: R) -> Self {
        let anchors = config.anchor_patcher();
        let dom = DomPatcher::new(config.parse_options());
        Self {
            config,
            engine: DiscountEngine::new(coupon_orders, coupons),
            orders,
            anchors,
            dom,
        }
    }

    pub fn config(&self) -> &CouponConfig {
        &self.config
    }

    pub fn engine(&self) -> &DiscountEngine<O, C> {
        &self.engine
    }

    /// Shopping page render: splice in the coupon block and expose the coupon
    /// order to the template.
    ///
    /// On hosts without a discount line the coupon discount is also folded into
    /// the displayed total, which is persisted.
    pub fn on_render_shopping_index(
        &self,
        mut render: TemplateRender,
        fragments: &ShoppingFragments,
    ) -> Result<TemplateRender, HookError> {
        tracing::info!("coupon hook on_render_shopping_index start");
        let Some(order) = render.order.take() else {
            return Ok(render);
        };

        let coupon_order = self.engine.coupon_order_for(&order.pre_order_id)?;
        render.source = self.anchors.insert_fragment(&render.source, &fragments.coupon_item);

        let mut order = order;
        if !self.config.supports_display_discount() && coupon_order.is_some() {
            let Reconciled { order: adjusted, .. } =
                DiscountEngine::<O, C>::apply_discount_for_render(&order, coupon_order.as_ref())?;
            self.orders.save(adjusted.clone())?;

            match anchor::insert_after(&render.source, SUMMARY_ANCHOR, &fragments.discount_row) {
                Some(source) => render.source = source,
                None => tracing::debug!("summary anchor missing; discount row not shown"),
            }
            order = adjusted;
        }

        render.order = Some(order);
        render
            .context
            .insert(COUPON_ORDER_KEY.to_string(), serde_json::to_value(&coupon_order)?);
        tracing::info!("coupon hook on_render_shopping_index finish");
        Ok(render)
    }

    /// Confirmation page init: stop the flow if the coupon was already used.
    pub fn on_shopping_confirm_init(
        &self,
        pre_order_id: Option<&PreOrderId>,
        customer: &Customer,
    ) -> Result<(), HookError> {
        let Some(pre_order_id) = pre_order_id else {
            return Ok(());
        };
        let Some(coupon_order) = self.engine.coupon_order_for(pre_order_id)? else {
            return Ok(());
        };

        if let Err(err) = self.engine.check_coupon_used_or_not(&coupon_order, customer) {
            tracing::warn!(
                pre_order_id = %pre_order_id,
                coupon_code = %coupon_order.coupon_code(),
                error = %err,
                "coupon usage check failed"
            );
            return Err(err.into());
        }
        Ok(())
    }

    /// Completion page render: consume the coupon of the completed order.
    pub fn on_render_shopping_complete(
        &self,
        order_id: Option<OrderId>,
        occurred_at: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, HookError> {
        let Some(order_id) = order_id else {
            return Ok(ReconcileOutcome::NoOp);
        };
        let Some(coupon_order) = self.engine.coupon_orders().find_by_order_id(order_id)? else {
            return Ok(ReconcileOutcome::NoOp);
        };

        Ok(self.engine.finalize_coupon_use(&coupon_order, occurred_at)?)
    }

    /// Admin order-edit page: show the coupon used by the order.
    ///
    /// `render_fragment` produces the coupon panel markup. The page comes back
    /// unchanged when the order has no used coupon, the layout anchors are
    /// missing, or the page cannot be patched.
    pub fn on_admin_order_edit_init<F>(
        &self,
        order_id: Option<&str>,
        html: String,
        render_fragment: F,
    ) -> Result<String, HookError>
    where
        F: FnOnce(&Coupon, &CouponOrder) -> String,
    {
        let Some(raw_id) = order_id else {
            return Ok(html);
        };
        let order_id = match raw_id.parse::<OrderId>() {
            Ok(id) => id,
            Err(err) => {
                tracing::debug!(order_id = %raw_id, error = %err, "admin order id not usable");
                return Ok(html);
            }
        };

        let Some(coupon_order) = self
            .engine
            .coupon_orders()
            .find_by_order_id(order_id)?
            .filter(CouponOrder::is_used)
        else {
            return Ok(html);
        };
        let Some(coupon) = self.engine.coupons().find(coupon_order.coupon_id())? else {
            return Ok(html);
        };

        let fragment = render_fragment(&coupon, &coupon_order);
        match self
            .dom
            .insert_fragment_before_anchor(&html, &fragment, &self.config.admin_anchors())
        {
            Ok(patched) => Ok(patched.unwrap_or(html)),
            Err(err) => {
                tracing::warn!(order_id = %order_id, error = %err, "admin page not patched");
                Ok(html)
            }
        }
    }

    /// Delivery or payment change: undo the coupon if the total went negative,
    /// persisting the corrected order.
    pub fn on_restore_discount(&self, trigger: RestoreTrigger) -> Result<Reconciled, HookError> {
        let order = trigger.into_order();
        let reconciled = self.engine.restore_discount_if_negative(&order)?;
        if reconciled.rolled_back() {
            self.orders.save(reconciled.order.clone())?;
        }
        Ok(reconciled)
    }
}
