//! Order placement with enrollment, confirmation mail, and the admin
//! order list.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::mailer::{
    MailMessage, Mailer, ORDER_DATE_FORMAT, OrderConfirmationMail, render_mail,
};
use crate::application::repos::{
    CoursesRepo, NewNotificationParams, NewOrderParams, NotificationsRepo, OrdersRepo, UsersRepo,
};
use crate::application::sessions::Principal;
use crate::domain::entities::OrderRecord;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub course_id: Uuid,
    pub payment: Option<Value>,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrdersRepo>,
    courses: Arc<dyn CoursesRepo>,
    users: Arc<dyn UsersRepo>,
    notifications: Arc<dyn NotificationsRepo>,
    mailer: Arc<dyn Mailer>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrdersRepo>,
        courses: Arc<dyn CoursesRepo>,
        users: Arc<dyn UsersRepo>,
        notifications: Arc<dyn NotificationsRepo>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            orders,
            courses,
            users,
            notifications,
            mailer,
        }
    }

    /// Places an order and enrolls the buyer. Side effects run after the
    /// order row exists: confirmation mail first (a failure surfaces as the
    /// request error while the order stays persisted), then the buyer's own
    /// "New Order" notification.
    pub async fn create_order(
        &self,
        principal: &Principal,
        command: CreateOrderCommand,
    ) -> Result<OrderRecord, AppError> {
        if principal.enrolled_in(command.course_id) {
            return Err(
                DomainError::validation("You have already purchased this course").into(),
            );
        }
        let course = self
            .courses
            .find_course(command.course_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Course"))?;

        let order = self
            .orders
            .create_order(NewOrderParams {
                user_id: principal.user_id,
                course_id: command.course_id,
                payment: command.payment,
            })
            .await?;
        self.users
            .append_enrollment(principal.user_id, command.course_id)
            .await?;

        let order_id = order.id.to_string();
        let ordered_on = order
            .created_at
            .format(ORDER_DATE_FORMAT)
            .map_err(|err| AppError::unexpected(format!("order date format: {err}")))?;
        let mail = OrderConfirmationMail {
            // short reference, enough for a receipt
            order_ref: &order_id[..6],
            course_name: &course.name,
            price: course.price,
            ordered_on: &ordered_on,
        };
        let html = render_mail(&mail, "order_confirmation")?;
        self.mailer
            .send(MailMessage {
                to: principal.email.clone(),
                subject: "Order Confirmation".to_owned(),
                html,
            })
            .await?;

        self.notifications
            .create_notification(NewNotificationParams {
                user_id: principal.user_id,
                title: "New Order".to_owned(),
                message: format!("You have a new order from {}", course.name),
            })
            .await?;

        Ok(order)
    }

    /// All orders, newest first, for the admin panel.
    pub async fn list_orders_admin(&self) -> Result<Vec<OrderRecord>, AppError> {
        Ok(self.orders.list_orders().await?)
    }
}
