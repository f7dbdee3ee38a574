pub mod testimonial_handler;

pub use testimonial_handler::{
    __path_approve_testimonial, __path_create_testimonial, __path_list_approved_testimonials,
    __path_list_pending_testimonials, approve_testimonial, create_testimonial,
    list_approved_testimonials, list_pending_testimonials,
};
