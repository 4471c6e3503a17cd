mod aggregation;
mod member_detail;
mod retry;
