pub(crate) mod admin;
pub(crate) mod child;
pub(crate) mod family;
pub(crate) mod health;
pub(crate) mod prices;
pub(crate) mod stocks;
pub(crate) mod trades;
