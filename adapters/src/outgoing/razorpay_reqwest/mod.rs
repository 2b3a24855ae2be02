pub mod payment_gateway_razorpay;
