pub mod grant;

pub mod models {
    pub mod grant;
    pub mod member;
    pub mod payment;
    pub mod plan;
}

pub mod dtos {
    pub mod member;
    pub mod page;
    pub mod payment;
    pub mod plan;
    pub mod sub;
}

pub mod services {
    pub mod analytics;
    pub mod member;
    pub mod pay;
    pub mod plan;
}

mod misc {
    pub(crate) mod date;
}
