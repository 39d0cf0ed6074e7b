mod process_inbound;

pub use process_inbound::ProcessInboundMessageUseCase;
