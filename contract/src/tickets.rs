use cosmwasm_std::Storage;

use crate::{
    error::ContractError,
    evidence::TransactionResult,
    operation::{create_pending_operation, OperationType},
    state::{AVAILABLE_TICKETS, CONFIG, PENDING_TICKET_UPDATE, USED_TICKETS_COUNTER},
};

/// Takes the next ticket from the pool for a new operation. The last ticket is
/// reserved for the allocation operation that refills the pool.
pub fn allocate_ticket(storage: &mut dyn Storage) -> Result<u64, ContractError> {
    let mut available_tickets = AVAILABLE_TICKETS.load(storage)?;

    if available_tickets.is_empty() {
        return Err(ContractError::NoAvailableTickets {});
    }

    if available_tickets.len() == 1 && !PENDING_TICKET_UPDATE.load(storage)? {
        return Err(ContractError::LastTicketReserved {});
    }

    let ticket = available_tickets.pop_front().unwrap();
    AVAILABLE_TICKETS.save(storage, &available_tickets)?;

    Ok(ticket)
}

/// Counts a consumed ticket and self-triggers a ticket allocation operation
/// once the configured threshold of consumed tickets is reached.
pub fn register_used_ticket(
    storage: &mut dyn Storage,
    timestamp: u64,
) -> Result<(), ContractError> {
    let used_tickets = USED_TICKETS_COUNTER.load(storage)? + 1;
    USED_TICKETS_COUNTER.save(storage, &used_tickets)?;

    let config = CONFIG.load(storage)?;

    if used_tickets >= config.used_ticket_sequence_threshold
        && !PENDING_TICKET_UPDATE.load(storage)?
    {
        let mut available_tickets = AVAILABLE_TICKETS.load(storage)?;
        // If the pool is fully drained the owner must recover with an account sequence
        if let Some(ticket_to_update) = available_tickets.pop_front() {
            AVAILABLE_TICKETS.save(storage, &available_tickets)?;

            create_pending_operation(
                storage,
                timestamp,
                Some(ticket_to_update),
                None,
                OperationType::AllocateTickets {
                    number: used_tickets,
                },
            )?;

            PENDING_TICKET_UPDATE.save(storage, &true)?;
        }
    }

    Ok(())
}

/// Puts a ticket back into the pool after an operation that never consumed it.
pub fn return_ticket(storage: &mut dyn Storage, ticket: u64) -> Result<(), ContractError> {
    let mut available_tickets = AVAILABLE_TICKETS.load(storage)?;
    available_tickets.push_back(ticket);
    AVAILABLE_TICKETS.save(storage, &available_tickets)?;

    Ok(())
}

pub fn handle_ticket_allocation_confirmation(
    storage: &mut dyn Storage,
    tickets: Option<Vec<u64>>,
    number: u32,
    transaction_result: &TransactionResult,
) -> Result<(), ContractError> {
    if transaction_result.eq(&TransactionResult::Accepted) {
        let tickets = tickets.ok_or(ContractError::InvalidTicketNumberToAllocate {})?;
        if tickets.len() as u32 != number {
            return Err(ContractError::InvalidTicketNumberToAllocate {});
        }

        let mut available_tickets = AVAILABLE_TICKETS.load(storage)?;
        available_tickets.extend(tickets);
        AVAILABLE_TICKETS.save(storage, &available_tickets)?;

        USED_TICKETS_COUNTER.save(storage, &0)?;
    }

    PENDING_TICKET_UPDATE.save(storage, &false)?;

    Ok(())
}
