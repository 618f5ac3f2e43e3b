mod helpers;
mod notifications;
mod orders;
