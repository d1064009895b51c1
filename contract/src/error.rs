use cosmwasm_std::{DivideByZeroError, OverflowError, StdError};
use cw_ownable::OwnershipError;
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    DivideByZero(#[from] DivideByZeroError),

    #[error("InvalidThreshold: Threshold must be more than 0 and no more than the amount of relayers")]
    InvalidThreshold {},

    #[error("InvalidUsedTicketSequenceThreshold: Used ticket sequence threshold must be more than 1 and less or equal than {}", crate::contract::MAX_TICKETS_PER_ALLOCATION)]
    InvalidUsedTicketSequenceThreshold {},

    #[error("InvalidFundsAmount: Need to send exactly the issue fee amount")]
    InvalidFundsAmount {},

    #[error("DuplicatedRelayer: All relayers must have different coreum addresses, XRPL addresses and XRPL public keys")]
    DuplicatedRelayer {},

    #[error("TooManyRelayers: The maximum amount of relayers is {}", crate::contract::MAX_RELAYERS)]
    TooManyRelayers {},

    #[error("InvalidXRPLAddress: The XRPL address {} is not valid", address)]
    InvalidXRPLAddress { address: String },

    #[error("InvalidXRPLCurrency: The currency must be a 3 character string or a 40 character hexadecimal string")]
    InvalidXRPLCurrency {},

    #[error("UnauthorizedSender: Sender is not a valid relayer")]
    UnauthorizedSender {},

    #[error("CoreumTokenAlreadyRegistered: Token {} already registered", denom)]
    CoreumTokenAlreadyRegistered { denom: String },

    #[error(
        "XRPLTokenAlreadyRegistered: Token with issuer: {} and currency: {} is already registered",
        issuer,
        currency
    )]
    XRPLTokenAlreadyRegistered { issuer: String, currency: String },

    #[error(
        "RegistrationFailure: Currency/denom generated already exists, please try again"
    )]
    RegistrationFailure {},

    #[error("TokenNotRegistered: The token must be registered first before bridging")]
    TokenNotRegistered {},

    #[error("TokenDisabled: The token is not enabled for bridging")]
    TokenDisabled {},

    #[error("XRPLTokenNotInactive: To recover a registration the token must be in inactive state")]
    XRPLTokenNotInactive {},

    #[error("TokenStateIsImmutable: Current token state can not be modified by the owner")]
    TokenStateIsImmutable {},

    #[error("InvalidTargetTokenState: The owner can only set the token state to enabled or disabled")]
    InvalidTargetTokenState {},

    #[error("InvalidTargetMaxHoldingAmount: Max holding amount can not be lower than the current amount of tokens the bridge holds")]
    InvalidTargetMaxHoldingAmount {},

    #[error("InvalidSendingPrecision: The sending precision can not be more than the token decimals or less than -15")]
    InvalidSendingPrecision {},

    #[error("InvalidDecimals: Decimals must be between 1 and 20")]
    InvalidDecimals {},

    #[error("InvalidTicketNumberToAllocate: The number of tickets to allocate must be between 1 and 250 and match the allocation evidence")]
    InvalidTicketNumberToAllocate {},

    #[error(
        "PendingTicketUpdate: There is a pending ticket allocation operation already in the queue"
    )]
    PendingTicketUpdate {},

    #[error("NoAvailableTickets: There are no available tickets left in the ticket pool")]
    NoAvailableTickets {},

    #[error("LastTicketReserved: Last available ticket is reserved for the next ticket allocation")]
    LastTicketReserved {},

    #[error("PendingOperationNotFound: There is no pending operation with this ticket/account sequence")]
    PendingOperationNotFound {},

    #[error("PendingOperationAlreadyExists: There is already a pending operation with this ticket/account sequence")]
    PendingOperationAlreadyExists {},

    #[error("OperationVersionMismatch: The signature was provided for a different version of the operation")]
    OperationVersionMismatch {},

    #[error("OperationAlreadyExecuted: The operation has already been executed")]
    OperationAlreadyExecuted {},

    #[error(
        "EvidenceAlreadyProvided: The relayer already provided its evidence for the operation"
    )]
    EvidenceAlreadyProvided {},

    #[error("SignatureAlreadyProvided: There is already a signature provided for this relayer and this operation version")]
    SignatureAlreadyProvided {},

    #[error("InvalidTransactionResultEvidence: An evidence must contain exactly one of account sequence and ticket sequence")]
    InvalidTransactionResultEvidence {},

    #[error("InvalidSuccessfulTransactionResultEvidence: An evidence with a successful or rejected result must contain a transaction hash")]
    InvalidSuccessfulTransactionResultEvidence {},

    #[error("InvalidFailedTransactionResultEvidence: An evidence with an invalid result can not contain a transaction hash")]
    InvalidFailedTransactionResultEvidence {},

    #[error("InvalidOperationResult: The operation result does not match the operation type in the queue")]
    InvalidOperationResult {},

    #[error("InvalidAmount: Amount must be more than 0")]
    InvalidAmount {},

    #[error("AmountSentIsZeroAfterTruncation: Amount sent is zero after truncating to sending precision")]
    AmountSentIsZeroAfterTruncation {},

    #[error("MaximumBridgedAmountReached: The maximum amount this token can have bridged has been reached")]
    MaximumBridgedAmountReached {},

    #[error("InvalidDeliverAmount: The deliver amount must be less or equal than the amount after fees and is only allowed for XRPL originated tokens other than XRP")]
    InvalidDeliverAmount {},

    #[error("CannotCoverBridgingFees: The amount sent is not enough to cover the bridging fees")]
    CannotCoverBridgingFees {},

    #[error("ProhibitedRecipient: The recipient is prohibited from receiving bridged funds")]
    ProhibitedRecipient {},

    #[error("BridgeHalted: The bridge is currently halted and this operation is not allowed")]
    BridgeHalted {},

    #[error("RotateKeysOngoing: There is a pending keys rotation that must be confirmed before this operation is allowed")]
    RotateKeysOngoing {},

    #[error("PendingRefundNotFound: There is no pending refund with this id for this sender")]
    PendingRefundNotFound {},

    #[error("NotEnoughFeesToClaim: There are not enough collected fees to claim the requested amount")]
    NotEnoughFeesToClaim {},
}
